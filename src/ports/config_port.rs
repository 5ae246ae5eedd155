//! Configuration access port trait.
//!
//! Values come back as raw strings; parsing and range checks live with the
//! settings that own each key.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    /// Keys present in `section`, empty if the section is absent.
    fn keys(&self, section: &str) -> Vec<String>;
}
