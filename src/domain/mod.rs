pub mod new_prospect;
pub mod prospect;
pub mod prospect_email;
