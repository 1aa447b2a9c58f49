pub mod gift_certificate;
pub mod tag;

pub use gift_certificate::{GiftCertificate, NewGiftCertificate};
pub use tag::Tag;
