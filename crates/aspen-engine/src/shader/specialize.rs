use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::ShaderError;

/// Matches `layout(constant_id = N) const <type> NAME = <default>;`.
static SPEC_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"layout\s*\(\s*constant_id\s*=\s*(\d+)\s*\)\s*const\s+(bool|int|uint|float)\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([^;]+);",
    )
    .expect("specialization constant pattern is valid")
});

/// Line and block comments; declarations inside them are left untouched.
static COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)//[^\n]*|/\*.*?\*/").expect("comment pattern is valid")
});

fn comment_spans(source: &str) -> Vec<Range<usize>> {
    COMMENT.find_iter(source).map(|m| m.range()).collect()
}

/// Declarations outside comments, in source order.
fn live_declarations<'s>(source: &'s str) -> impl Iterator<Item = regex::Captures<'s>> {
    let comments = comment_spans(source);
    SPEC_DECL.captures_iter(source).filter(move |caps| {
        caps.get(0)
            .is_some_and(|m| !comments.iter().any(|c| c.contains(&m.start())))
    })
}

/// Scalar type of a specialization constant.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SpecType {
    Bool,
    Int,
    Uint,
    Float,
}

impl SpecType {
    fn from_glsl(ty: &str) -> Option<Self> {
        match ty {
            "bool" => Some(Self::Bool),
            "int" => Some(Self::Int),
            "uint" => Some(Self::Uint),
            "float" => Some(Self::Float),
            _ => None,
        }
    }

    pub fn glsl_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
        }
    }
}

impl fmt::Display for SpecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glsl_name())
    }
}

/// Value supplied for a specialization constant.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SpecValue {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Float(f32),
}

impl SpecValue {
    pub fn ty(self) -> SpecType {
        match self {
            Self::Bool(_) => SpecType::Bool,
            Self::Int(_) => SpecType::Int,
            Self::Uint(_) => SpecType::Uint,
            Self::Float(_) => SpecType::Float,
        }
    }

    /// GLSL literal for this value. Floats always carry a decimal point or exponent.
    fn to_glsl(self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Uint(v) => format!("{v}u"),
            Self::Float(v) => format!("{v:?}"),
        }
    }
}

/// A `(constant_id, value)` pair requested for a pipeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpecConstant {
    pub id: u32,
    pub value: SpecValue,
}

impl SpecConstant {
    #[inline]
    pub const fn new(id: u32, value: SpecValue) -> Self {
        Self { id, value }
    }
}

/// A specialization constant declared in GLSL source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDeclaration {
    pub id: u32,
    pub ty: SpecType,
    pub name: String,
    /// Default value exactly as written in the source.
    pub default: String,
}

/// Lists the specialization constants declared in `source`, in source order.
pub fn declarations(source: &str) -> Result<Vec<SpecDeclaration>, ShaderError> {
    live_declarations(source)
        .map(|caps| {
            let id = caps[1]
                .parse::<u32>()
                .map_err(|_| ShaderError::InvalidConstantId(caps[1].to_string()))?;
            let ty = SpecType::from_glsl(&caps[2])
                .ok_or_else(|| ShaderError::InvalidConstantId(caps[1].to_string()))?;
            Ok(SpecDeclaration {
                id,
                ty,
                name: caps[3].to_string(),
                default: caps[4].trim().to_string(),
            })
        })
        .collect()
}

/// Resolves every specialization constant in `source`.
///
/// Each `layout(constant_id = N)` declaration becomes a plain `const` carrying the
/// requested value, or its declared default when `constants` has no entry for `N`.
/// The result no longer depends on pipeline-time specialization.
pub fn specialize(source: &str, constants: &[SpecConstant]) -> Result<String, ShaderError> {
    let mut requested: HashMap<u32, SpecValue> = HashMap::with_capacity(constants.len());
    for c in constants {
        if let SpecValue::Float(v) = c.value {
            if !v.is_finite() {
                return Err(ShaderError::NonFinite { id: c.id });
            }
        }
        if requested.insert(c.id, c.value).is_some() {
            return Err(ShaderError::DuplicateValue { id: c.id });
        }
    }

    let mut declared = HashSet::new();
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for caps in live_declarations(source) {
        let Some(whole) = caps.get(0) else { continue };

        let id = caps[1]
            .parse::<u32>()
            .map_err(|_| ShaderError::InvalidConstantId(caps[1].to_string()))?;
        let ty = SpecType::from_glsl(&caps[2])
            .ok_or_else(|| ShaderError::InvalidConstantId(caps[1].to_string()))?;
        let name = &caps[3];

        if !declared.insert(id) {
            return Err(ShaderError::DuplicateDeclaration { id });
        }

        let value = match requested.remove(&id) {
            Some(v) if v.ty() != ty => {
                return Err(ShaderError::TypeMismatch {
                    id,
                    name: name.to_string(),
                    declared: ty,
                    supplied: v.ty(),
                });
            }
            Some(v) => v.to_glsl(),
            None => caps[4].trim().to_string(),
        };

        out.push_str(&source[cursor..whole.start()]);
        out.push_str(&format!("const {ty} {name} = {value};"));
        cursor = whole.end();
    }
    out.push_str(&source[cursor..]);

    if let Some(&id) = requested.keys().min() {
        return Err(ShaderError::UnknownConstant { id });
    }

    log::trace!("resolved {} specialization constant(s)", declared.len());
    Ok(out)
}
