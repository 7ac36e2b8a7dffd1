//! Intake component: the registration form, image uploads, submission into
//! the persisted slot, and the spreadsheet / preview exports.

pub mod form;
pub mod handlers;
pub mod submit;
pub mod upload;

pub use upload::ImageDraft;
