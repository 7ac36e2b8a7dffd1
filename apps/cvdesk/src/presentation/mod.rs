//! Presentation component: loads the stored record and renders the bilingual
//! document, with PDF export and print mode.

pub mod handlers;
pub mod html;
pub mod view;
