use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default command count above which free-hand paths are thinned at encode.
pub const DEFAULT_DECIMATION_THRESHOLD: usize = 100;

/// One absolute path command of a free-hand stroke.
///
/// Serialized in the engine's array form: `["M", x, y]`, `["L", x, y]`,
/// `["Q", cx, cy, x, y]`, `["C", c1x, c1y, c2x, c2y, x, y]`, `["Z"]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    QuadTo { cx: f64, cy: f64, x: f64, y: f64 },
    CubicTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
    Close,
}

impl PathCommand {
    pub fn letter(&self) -> &'static str {
        match self {
            PathCommand::MoveTo { .. } => "M",
            PathCommand::LineTo { .. } => "L",
            PathCommand::QuadTo { .. } => "Q",
            PathCommand::CubicTo { .. } => "C",
            PathCommand::Close => "Z",
        }
    }

    pub fn operands(&self) -> Vec<f64> {
        match *self {
            PathCommand::MoveTo { x, y } | PathCommand::LineTo { x, y } => vec![x, y],
            PathCommand::QuadTo { cx, cy, x, y } => vec![cx, cy, x, y],
            PathCommand::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => vec![c1x, c1y, c2x, c2y, x, y],
            PathCommand::Close => Vec::new(),
        }
    }

    /// Build a command from its letter and operands.
    ///
    /// Lowercase (relative) letters are not produced by free-hand capture
    /// and are rejected.
    pub fn from_parts(letter: &str, args: &[f64]) -> Option<Self> {
        match (letter, args) {
            ("M", &[x, y]) => Some(PathCommand::MoveTo { x, y }),
            ("L", &[x, y]) => Some(PathCommand::LineTo { x, y }),
            ("Q", &[cx, cy, x, y]) => Some(PathCommand::QuadTo { cx, cy, x, y }),
            ("C", &[c1x, c1y, c2x, c2y, x, y]) => Some(PathCommand::CubicTo {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            }),
            ("Z", &[]) => Some(PathCommand::Close),
            _ => None,
        }
    }

    /// End point of the command, if it moves the pen
    pub fn end_point(&self) -> Option<(f64, f64)> {
        match *self {
            PathCommand::MoveTo { x, y }
            | PathCommand::LineTo { x, y }
            | PathCommand::QuadTo { x, y, .. }
            | PathCommand::CubicTo { x, y, .. } => Some((x, y)),
            PathCommand::Close => None,
        }
    }
}

impl Serialize for PathCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let operands = self.operands();
        let mut seq = serializer.serialize_seq(Some(operands.len() + 1))?;
        seq.serialize_element(self.letter())?;
        for value in &operands {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathToken {
    Letter(String),
    Number(f64),
}

impl<'de> Deserialize<'de> for PathCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tokens = Vec::<PathToken>::deserialize(deserializer)?;
        let (letter, rest) = match tokens.split_first() {
            Some((PathToken::Letter(letter), rest)) => (letter, rest),
            _ => return Err(D::Error::custom("path command must start with a letter")),
        };

        let mut args = Vec::with_capacity(rest.len());
        for token in rest {
            match token {
                PathToken::Number(n) => args.push(*n),
                PathToken::Letter(l) => {
                    return Err(D::Error::custom(format!("unexpected '{}' in operands", l)))
                }
            }
        }

        PathCommand::from_parts(letter, &args).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid path command '{}' with {} operands",
                letter,
                args.len()
            ))
        })
    }
}

/// Drop every odd-indexed command.
///
/// Lossy and irreversible: 250 commands become 125. The leading move-to sits
/// at index 0 and always survives.
pub fn decimate(commands: &[PathCommand]) -> Vec<PathCommand> {
    commands.iter().step_by(2).copied().collect()
}
