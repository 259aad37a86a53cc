//! SeaORM entities, one module per table
//!
//! Enumerated columns (`status`, `priority`, `tag_type`, `role`) are stored
//! as text and parsed in the mapper.

pub mod enum_option;
pub mod enum_value;
pub mod invitation;
pub mod membership;
pub mod organization;
pub mod profile;
pub mod tag_date_value;
pub mod tag_key;
pub mod tag_number_value;
pub mod tag_text_value;
pub mod ticket;
pub mod ticket_comment;
