//! Annotation sites (§3): the identifier a nilability choice is attached to.

use nilcheck_base::{Position, Symbol};
use nilcheck_track::DeclId;

/// A program location at which a nilability choice must be made: a
/// parameter position, return position, field, global, receiver, or type
/// name, and their "deep" (element-type) variants.
///
/// Injectivity and determinism of this identifier are required for
/// soundness of cross-package inference (§3, §8 "Site injectivity").
/// `object_path` carries the frontend's [`DeclId`] directly rather than a
/// serialized string: `DeclId` is already guaranteed injective per
/// declaration (see `nilcheck_track::ast`'s module doc), so site
/// injectivity follows immediately rather than depending on some
/// string-rendering being collision-free. `object_repr` remains a display
/// name for diagnostics only and plays no role in equality-driving
/// soundness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Site {
    pub package_path: Symbol,
    pub object_repr: Symbol,
    pub object_path: DeclId,
    pub is_deep: bool,
    pub position: Position,
    pub exported: bool,
}

impl Site {
    pub fn new(
        package_path: Symbol,
        object_repr: Symbol,
        object_path: DeclId,
        is_deep: bool,
        position: Position,
        exported: bool,
    ) -> Self {
        Self {
            package_path,
            object_repr,
            object_path,
            is_deep,
            position,
            exported,
        }
    }

    /// The "deep" companion of this site (element-type nilability), used
    /// when a trigger's annotation targets a pointer/slice/map's contents
    /// rather than the binding itself.
    pub fn deep(&self) -> Site {
        Site {
            is_deep: true,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(decl: u32, pos: Position) -> Site {
        Site::new(Symbol::EMPTY, Symbol::EMPTY, DeclId(decl), false, pos, true)
    }

    #[test]
    fn distinct_decls_give_distinct_sites() {
        let a = site(1, Position::new(1, 1));
        let b = site(2, Position::new(1, 1));
        assert_ne!(a, b);
    }

    #[test]
    fn deep_flips_only_is_deep() {
        let a = site(1, Position::new(1, 1));
        let d = a.deep();
        assert!(d.is_deep);
        assert_eq!(d.position, a.position);
        assert_eq!(d.object_path, a.object_path);
    }
}
