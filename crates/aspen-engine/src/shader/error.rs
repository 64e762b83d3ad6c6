use super::SpecType;

/// Errors raised while finalizing a shader for a pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    #[error("specialization constant {id} is not declared by the shader")]
    UnknownConstant { id: u32 },

    #[error("specialization constant {id} (`{name}`) is declared as {declared} but a {supplied} value was supplied")]
    TypeMismatch {
        id: u32,
        name: String,
        declared: SpecType,
        supplied: SpecType,
    },

    #[error("specialization constant {id} is declared more than once")]
    DuplicateDeclaration { id: u32 },

    #[error("specialization constant {id} was supplied more than once")]
    DuplicateValue { id: u32 },

    #[error("specialization constant {id} has a non-finite value")]
    NonFinite { id: u32 },

    #[error("`{0}` is not a valid specialization constant id")]
    InvalidConstantId(String),

    #[error("{shader} has a fixed object array and cannot be resized")]
    NotSpecializable { shader: &'static str },

    #[error("object count {count} is outside 1..={max} for {shader}")]
    ObjectCount {
        shader: &'static str,
        count: u32,
        max: u32,
    },
}
