//! Registry domain model.
//!
//! # Responsibility
//! - Define parent (company/contact), child (phone/email) and lookup shapes.
//! - Own input validation and child value normalization rules.
//!
//! # Invariants
//! - Id `0` means "no entity" everywhere and is never an error.
//! - Every child row belongs to exactly one `Owner`.

pub mod child;
pub mod company;
pub mod contact;
pub mod lookup;
pub mod owner;
pub mod validation;
