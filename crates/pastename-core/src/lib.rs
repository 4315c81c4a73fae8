//! # pastename-core
//!
//! Name generation and de-duplication for attachments pasted into notes.
//!
//! This crate is pure logic; the only ambient inputs are the clock and a
//! random source used by the template renderer.
//! - [`NameContext`]: per-note values a template can refer to
//! - Template rendering ([`template`]) with Moment-style dates ([`date_format`])
//!   and random tokens ([`random`])
//! - Collision resolution ([`dedup`]) under a [`DedupPolicy`]
//! - File name sanitizing ([`sanitize`]) and candidate names ([`naming`])
//! - Attachment classification ([`attachment`]) and link text ([`link`])
//! - [`Settings`] and the error hierarchy ([`PasteNameError`], [`PolicyError`])
//! - Frontmatter and heading extraction ([`frontmatter`])

pub mod attachment;
pub mod context;
pub mod date_format;
pub mod dedup;
pub mod error;
pub mod frontmatter;
pub mod link;
pub mod naming;
pub mod random;
pub mod sanitize;
pub mod settings;
pub mod template;

pub use attachment::AttachmentFilter;
pub use context::NameContext;
pub use dedup::{resolve, DedupPolicy, FinalName, NumberPosition};
pub use error::{PasteNameError, PolicyError, Result};
pub use link::LinkStyle;
pub use naming::{generate_new_name, GeneratedName};
pub use settings::Settings;
pub use template::{render, render_with, RenderOptions};
