use std::fmt;

use clap::{Parser, ValueEnum};

/// Aspen studio: animated preview of the instanced shader variants.
#[derive(Parser, Debug)]
#[command(name = "aspen-studio", version, about)]
pub struct Args {
    /// Shader variant shown first (switch at runtime with keys 1, 2, 3).
    #[arg(short, long, value_enum, default_value_t = Variant::OffsetScale)]
    pub variant: Variant,

    /// Number of animated objects.
    #[arg(short = 'n', long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(1..=64))]
    pub objects: u32,

    /// Log filter override, `env_logger` syntax (e.g. "debug", "aspen_engine=trace").
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Vertex shader variant driven by the studio.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    OffsetScale,
    Matrix,
    Pulse,
}

impl Variant {
    /// Maps the number keys 1..=3 to variants.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::OffsetScale),
            2 => Some(Self::Matrix),
            3 => Some(Self::Pulse),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OffsetScale => "offset/scale",
            Self::Matrix => "matrix",
            Self::Pulse => "pulse",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["aspen-studio"]).unwrap();
        assert_eq!(args.variant, Variant::OffsetScale);
        assert_eq!(args.objects, 4);
        assert!(args.log_level.is_none());
    }

    #[test]
    fn variant_and_count_parse() {
        let args = Args::try_parse_from(["aspen-studio", "--variant", "pulse", "-n", "12"]).unwrap();
        assert_eq!(args.variant, Variant::Pulse);
        assert_eq!(args.objects, 12);
    }

    #[test]
    fn object_count_is_bounded() {
        assert!(Args::try_parse_from(["aspen-studio", "-n", "0"]).is_err());
        assert!(Args::try_parse_from(["aspen-studio", "-n", "65"]).is_err());
    }

    #[test]
    fn digits_select_variants() {
        assert_eq!(Variant::from_digit(2), Some(Variant::Matrix));
        assert_eq!(Variant::from_digit(4), None);
    }
}
