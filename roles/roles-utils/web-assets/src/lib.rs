pub mod icons;
pub mod pages;
