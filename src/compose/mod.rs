pub mod card;
pub(crate) mod plan;
