//! The slim type system.
//!
//! Types are interned: the registry builds every built-in instance exactly
//! once, and [`TypeRef`] equality is reference identity. Nothing outside
//! the registry can construct a `Type`, so two references to "vec3" are
//! always pointer-equal and the typechecker never compares structurally.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::intern::Interner;
use crate::symtab::SymbolTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
}

impl ScalarKind {
    fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Float => "float",
        }
    }

    /// Prefix of the vector family with this element type ("" for floats,
    /// so `vec3` rather than `fvec3`).
    fn vector_prefix(self) -> &'static str {
        match self {
            ScalarKind::Bool => "b",
            ScalarKind::Int => "i",
            ScalarKind::UInt => "u",
            ScalarKind::Float => "",
        }
    }
}

#[derive(Debug)]
pub struct FunctionType {
    pub params: Vec<TypeRef>,
    pub overloads: Vec<Vec<TypeRef>>,
    pub ret: TypeRef,
}

#[derive(Debug)]
pub enum Type {
    Scalar(ScalarKind),
    Vector { elem: ScalarKind, len: u8 },
    /// Square, float-element matrix.
    Matrix { size: u8 },
    Sampler2D,
    Function(FunctionType),
}

impl Type {
    pub fn name(&self) -> String {
        match self {
            Type::Scalar(kind) => kind.name().to_string(),
            Type::Vector { elem, len } => format!("{}vec{}", elem.vector_prefix(), len),
            Type::Matrix { size } => format!("mat{}", size),
            Type::Sampler2D => "sampler2D".to_string(),
            Type::Function(f) => {
                let params: Vec<String> = f.params.iter().map(|p| p.name()).collect();
                format!("fn({}) -> {}", params.join(", "), f.ret.name())
            }
        }
    }
}

/// Shared handle to an interned type. Equality is identity: two refs are
/// equal only when they point at the same registry instance.
#[derive(Debug, Clone)]
pub struct TypeRef(Rc<Type>);

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl Deref for TypeRef {
    type Target = Type;

    fn deref(&self) -> &Type {
        &self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Component alias sets accepted by swizzling. A field must draw all of its
/// characters from a single set.
const SWIZZLE_SETS: [&[u8; 4]; 3] = [b"xyzw", b"rgba", b"stpq"];

const VECTOR_LENGTHS: [u8; 3] = [2, 3, 4];
const MATRIX_SIZES: [u8; 3] = [2, 3, 4];
const SCALARS: [ScalarKind; 4] = [
    ScalarKind::Bool,
    ScalarKind::Int,
    ScalarKind::UInt,
    ScalarKind::Float,
];

/// Owns the single instance of every built-in type, keyed by the names the
/// language spells them with.
#[derive(Debug)]
pub struct TypeRegistry {
    by_name: HashMap<String, TypeRef>,
    scalars: HashMap<ScalarKind, TypeRef>,
    vectors: HashMap<(ScalarKind, u8), TypeRef>,
    matrices: HashMap<u8, TypeRef>,
    sampler2d: TypeRef,
    /// Built-in functions installed into the root scope: constructors and
    /// the texture sampler.
    builtins: Vec<(&'static str, TypeRef)>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        let mut by_name = HashMap::new();
        let mut scalars = HashMap::new();
        let mut vectors = HashMap::new();
        let mut matrices = HashMap::new();

        for kind in SCALARS {
            let ty = TypeRef(Rc::new(Type::Scalar(kind)));
            by_name.insert(kind.name().to_string(), ty.clone());
            scalars.insert(kind, ty);
        }

        for kind in SCALARS {
            for len in VECTOR_LENGTHS {
                let ty = TypeRef(Rc::new(Type::Vector { elem: kind, len }));
                by_name.insert(ty.name(), ty.clone());
                vectors.insert((kind, len), ty);
            }
        }

        for size in MATRIX_SIZES {
            let ty = TypeRef(Rc::new(Type::Matrix { size }));
            by_name.insert(ty.name(), ty.clone());
            matrices.insert(size, ty);
        }

        let sampler2d = TypeRef(Rc::new(Type::Sampler2D));
        by_name.insert("sampler2D".to_string(), sampler2d.clone());

        let mut registry = TypeRegistry {
            by_name,
            scalars,
            vectors,
            matrices,
            sampler2d,
            builtins: Vec::new(),
        };
        registry.builtins = registry.build_builtins();
        registry
    }

    /// Resolve a data-type keyword to its interned instance.
    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).cloned()
    }

    pub fn scalar(&self, kind: ScalarKind) -> TypeRef {
        self.scalars[&kind].clone()
    }

    pub fn vector(&self, elem: ScalarKind, len: u8) -> TypeRef {
        self.vectors[&(elem, len)].clone()
    }

    pub fn matrix(&self, size: u8) -> TypeRef {
        self.matrices[&size].clone()
    }

    pub fn sampler2d(&self) -> TypeRef {
        self.sampler2d.clone()
    }

    /// Resolve a swizzle field against a vector type: one to four
    /// components drawn from a single alias set, each index below the
    /// vector length. One component yields the element scalar, more yield a
    /// vector of the field's length.
    pub fn swizzle(&self, ty: &TypeRef, field: &str) -> Option<TypeRef> {
        let Type::Vector { elem, len } = **ty else {
            return None;
        };
        if field.is_empty() || field.len() > 4 {
            return None;
        }

        let legal = SWIZZLE_SETS.iter().any(|set| {
            field.bytes().all(|c| {
                set.iter().position(|&s| s == c).is_some_and(|i| (i as u8) < len)
            })
        });
        if !legal {
            return None;
        }

        Some(if field.len() == 1 {
            self.scalar(elem)
        } else {
            self.vector(elem, field.len() as u8)
        })
    }

    fn function(params: Vec<TypeRef>, overloads: Vec<Vec<TypeRef>>, ret: TypeRef) -> TypeRef {
        TypeRef(Rc::new(Type::Function(FunctionType {
            params,
            overloads,
            ret,
        })))
    }

    fn build_builtins(&self) -> Vec<(&'static str, TypeRef)> {
        let mut builtins = Vec::new();

        // Vector constructors: per-component params, with a single-scalar
        // splat and the usual smaller-vector compositions as overloads.
        for kind in SCALARS {
            for len in VECTOR_LENGTHS {
                let scalar = self.scalar(kind);
                let ret = self.vector(kind, len);
                let params = vec![scalar.clone(); len as usize];

                let mut overloads = vec![vec![scalar.clone()]];
                match len {
                    3 => overloads.push(vec![self.vector(kind, 2), scalar.clone()]),
                    4 => {
                        overloads.push(vec![self.vector(kind, 3), scalar.clone()]);
                        overloads.push(vec![self.vector(kind, 2), self.vector(kind, 2)]);
                        overloads.push(vec![self.vector(kind, 2), scalar.clone(), scalar.clone()]);
                    }
                    _ => {}
                }

                let name = constructor_name(kind, len);
                builtins.push((name, Self::function(params, overloads, ret)));
            }
        }

        // Matrix constructors: per-column params or a diagonal scalar.
        for size in MATRIX_SIZES {
            let column = self.vector(ScalarKind::Float, size);
            let params = vec![column; size as usize];
            let overloads = vec![vec![self.scalar(ScalarKind::Float)]];
            let name = match size {
                2 => "mat2",
                3 => "mat3",
                _ => "mat4",
            };
            builtins.push((name, Self::function(params, overloads, self.matrix(size))));
        }

        builtins.push((
            "texture",
            Self::function(
                vec![self.sampler2d(), self.vector(ScalarKind::Float, 2)],
                Vec::new(),
                self.vector(ScalarKind::Float, 4),
            ),
        ));

        builtins
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn constructor_name(kind: ScalarKind, len: u8) -> &'static str {
    match (kind, len) {
        (ScalarKind::Bool, 2) => "bvec2",
        (ScalarKind::Bool, 3) => "bvec3",
        (ScalarKind::Bool, 4) => "bvec4",
        (ScalarKind::Int, 2) => "ivec2",
        (ScalarKind::Int, 3) => "ivec3",
        (ScalarKind::Int, 4) => "ivec4",
        (ScalarKind::UInt, 2) => "uvec2",
        (ScalarKind::UInt, 3) => "uvec3",
        (ScalarKind::UInt, 4) => "uvec4",
        (ScalarKind::Float, 2) => "vec2",
        (ScalarKind::Float, 3) => "vec3",
        (ScalarKind::Float, 4) => "vec4",
        _ => unreachable!("vector lengths are 2..=4"),
    }
}

/// Declare the built-in functions into the symbol table's root scope.
pub fn install_builtins(
    registry: &TypeRegistry,
    symbols: &mut SymbolTable,
    interner: &mut Interner,
    ordinals: &mut crate::ast::Ordinals,
) {
    for (name, ty) in &registry.builtins {
        let sym = interner.intern(name);
        symbols
            .declare(ordinals.next(), sym, ty.clone())
            .expect("built-in declared twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Ordinals;

    #[test]
    fn registry_interns_each_type_once() {
        let types = TypeRegistry::new();
        assert_eq!(types.get("vec3").unwrap(), types.get("vec3").unwrap());
        assert_eq!(types.get("vec3").unwrap(), types.vector(ScalarKind::Float, 3));
        assert_ne!(types.get("vec3").unwrap(), types.get("vec4").unwrap());
        assert_ne!(types.get("vec3").unwrap(), types.get("ivec3").unwrap());
    }

    #[test]
    fn all_data_type_keywords_resolve() {
        let types = TypeRegistry::new();
        for name in [
            "bool", "int", "uint", "float", "bvec2", "bvec3", "bvec4", "ivec2", "ivec3",
            "ivec4", "uvec2", "uvec3", "uvec4", "vec2", "vec3", "vec4", "mat2", "mat3",
            "mat4", "sampler2D",
        ] {
            assert!(types.get(name).is_some(), "missing type {name}");
        }
        assert!(types.get("vec5").is_none());
    }

    #[test]
    fn type_names_round_trip() {
        let types = TypeRegistry::new();
        for name in ["uint", "bvec2", "uvec4", "mat3", "sampler2D"] {
            assert_eq!(types.get(name).unwrap().name(), name);
        }
    }

    #[test]
    fn swizzle_selects_components_from_one_alias_set() {
        let types = TypeRegistry::new();
        let vec3 = types.get("vec3").unwrap();

        assert_eq!(types.swizzle(&vec3, "y"), Some(types.get("float").unwrap()));
        assert_eq!(types.swizzle(&vec3, "xy"), Some(types.get("vec2").unwrap()));
        assert_eq!(types.swizzle(&vec3, "rgb"), Some(types.get("vec3").unwrap()));
        assert_eq!(types.swizzle(&vec3, "stp"), Some(types.get("vec3").unwrap()));
        // Repetition is fine; it still names real components.
        assert_eq!(types.swizzle(&vec3, "xxyy"), Some(types.get("vec4").unwrap()));
    }

    #[test]
    fn swizzle_rejects_mixed_sets_and_out_of_range_components() {
        let types = TypeRegistry::new();
        let vec2 = types.get("vec2").unwrap();
        let vec3 = types.get("vec3").unwrap();
        let float_ty = types.get("float").unwrap();

        // 'y' and 'q' come from different alias sets.
        assert_eq!(types.swizzle(&vec3, "yq"), None);
        // 'z' is the third component; vec2 has two.
        assert_eq!(types.swizzle(&vec2, "z"), None);
        assert_eq!(types.swizzle(&vec3, "w"), None);
        // Too long, too short, or not a vector at all.
        assert_eq!(types.swizzle(&vec3, "xxxxx"), None);
        assert_eq!(types.swizzle(&vec3, ""), None);
        assert_eq!(types.swizzle(&float_ty, "x"), None);
    }

    #[test]
    fn swizzle_preserves_the_element_kind() {
        let types = TypeRegistry::new();
        let ivec3 = types.get("ivec3").unwrap();
        assert_eq!(types.swizzle(&ivec3, "xz"), Some(types.get("ivec2").unwrap()));
        assert_eq!(types.swizzle(&ivec3, "x"), Some(types.get("int").unwrap()));
    }

    #[test]
    fn builtins_install_into_the_root_scope() {
        let types = TypeRegistry::new();
        let mut symbols = SymbolTable::new();
        let mut interner = Interner::new();
        let mut ordinals = Ordinals::new();
        install_builtins(&types, &mut symbols, &mut interner, &mut ordinals);

        let vec3 = interner.lookup("vec3").unwrap();
        let found = symbols.lookup_name(vec3).unwrap();
        let Type::Function(f) = &*found else {
            panic!("vec3 should be a constructor function");
        };
        assert_eq!(f.params.len(), 3);
        assert_eq!(f.ret, types.get("vec3").unwrap());
        assert!(f.overloads.contains(&vec![types.get("float").unwrap()]));

        assert!(interner.lookup("texture").is_some());
    }
}
