//! The element boundary
//!
//! The engine only ever writes style attributes on its element and reads its
//! computed style once per property to seed a starting value.

use crate::style::StyleDeclaration;

/// An element whose style the engine animates
pub trait StyleTarget {
    /// Write one style attribute
    fn set_style_property(&mut self, key: &str, value: &str);

    /// The element's current computed style, if the host can provide one
    fn computed_style(&self) -> Option<StyleDeclaration>;

    /// Write every entry of a declaration
    fn apply_style(&mut self, style: &StyleDeclaration) {
        for (key, value) in style.iter() {
            self.set_style_property(key, value);
        }
    }
}

/// An in-memory element: the declaration is its own style
impl StyleTarget for StyleDeclaration {
    fn set_style_property(&mut self, key: &str, value: &str) {
        self.set(key, value);
    }

    fn computed_style(&self) -> Option<StyleDeclaration> {
        Some(self.clone())
    }
}
