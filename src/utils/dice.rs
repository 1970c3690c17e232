//! # Dice Engine
//!
//! Rolls pools of dice and evaluates `NdM[+K]` expressions.
//!
//! Combat needs every individual face (it counts faces that cross a threshold),
//! so a roll always keeps the faces alongside the total.

use crate::{DelverError, DelverResult, RandomSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest die count accepted by the expression parser.
const MAX_PARSED_DICE: u32 = 10_000;

/// The result of rolling a pool of identical dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Individual face values in roll order
    pub faces: Vec<i32>,
    /// Sum of the faces
    pub total: i32,
}

impl DiceRoll {
    /// Counts faces at or above `threshold`.
    pub fn count_at_least(&self, threshold: i32) -> u32 {
        self.faces.iter().filter(|&&face| face >= threshold).count() as u32
    }

    /// Faces joined with `", "` for narration.
    pub fn trace(&self) -> String {
        self.faces
            .iter()
            .map(|face| face.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rolls `count` dice with `faces` sides each.
///
/// Rolling zero dice is fine and yields an empty pool; a die without faces is a
/// programming error.
///
/// # Examples
///
/// ```
/// use delver::{roll, SeededRandom};
///
/// let mut rng = SeededRandom::new(3);
/// let result = roll(4, 6, &mut rng).unwrap();
/// assert_eq!(result.faces.len(), 4);
/// assert!(result.total >= 4 && result.total <= 24);
/// ```
pub fn roll(count: u32, faces: u32, rng: &mut dyn RandomSource) -> DelverResult<DiceRoll> {
    if faces == 0 || faces > i32::MAX as u32 {
        return Err(DelverError::InvalidDice(format!(
            "a die needs between 1 and {} faces, got {}",
            i32::MAX,
            faces
        )));
    }

    let faces: Vec<i32> = (0..count)
        .map(|_| rng.next_range(1, faces as i32))
        .collect();
    let total = faces
        .iter()
        .try_fold(0i32, |sum, &face| sum.checked_add(face))
        .ok_or_else(|| {
            DelverError::InvalidDice(format!("{} dice total overflows", faces.len()))
        })?;

    Ok(DiceRoll { faces, total })
}

/// A parsed `NdM[+K]` dice expression.
///
/// Serializes as its notation, so templates and config files write `"2d5"`.
///
/// # Examples
///
/// ```
/// use delver::DiceExpression;
///
/// let expr: DiceExpression = "2d5+1".parse().unwrap();
/// assert_eq!(expr.count, 2);
/// assert_eq!(expr.faces, 5);
/// assert_eq!(expr.modifier, 1);
/// assert_eq!(expr.min(), 3);
/// assert_eq!(expr.max(), 11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpression {
    /// Number of dice
    pub count: u32,
    /// Faces per die
    pub faces: u32,
    /// Flat value added to the total
    pub modifier: i32,
}

impl DiceExpression {
    /// Creates an expression from its parts.
    pub fn new(count: u32, faces: u32, modifier: i32) -> Self {
        Self {
            count,
            faces,
            modifier,
        }
    }

    /// Rolls the expression and returns the total including the modifier.
    pub fn roll(&self, rng: &mut dyn RandomSource) -> DelverResult<i32> {
        Ok(self.roll_detailed(rng)?.total)
    }

    /// Rolls the expression keeping the individual faces.
    ///
    /// The modifier is folded into `total`; `faces` holds raw die values only.
    pub fn roll_detailed(&self, rng: &mut dyn RandomSource) -> DelverResult<DiceRoll> {
        let mut result = roll(self.count, self.faces, rng)?;
        result.total = result
            .total
            .checked_add(self.modifier)
            .ok_or_else(|| DelverError::InvalidDice(format!("{} total overflows", self)))?;
        Ok(result)
    }

    /// Smallest possible total.
    pub fn min(&self) -> i64 {
        self.count as i64 + self.modifier as i64
    }

    /// Largest possible total.
    pub fn max(&self) -> i64 {
        self.count as i64 * self.faces as i64 + self.modifier as i64
    }
}

impl FromStr for DiceExpression {
    type Err = DelverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = |reason: &str| DelverError::InvalidDice(format!("'{}': {}", s, reason));

        let d_index = text
            .find(|c: char| c == 'd' || c == 'D')
            .ok_or_else(|| invalid("missing 'd'"))?;
        let (count_text, rest) = text.split_at(d_index);
        let rest = &rest[1..];

        let count = if count_text.trim().is_empty() {
            1
        } else {
            count_text
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid("die count is not a number"))?
        };
        if count > MAX_PARSED_DICE {
            return Err(invalid("too many dice"));
        }

        let (faces_text, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
            Some(sign_index) => {
                let (faces_text, modifier_text) = rest.split_at(sign_index);
                let modifier = modifier_text
                    .replace(' ', "")
                    .parse::<i32>()
                    .map_err(|_| invalid("modifier is not a number"))?;
                (faces_text, modifier)
            }
            None => (rest, 0),
        };

        let faces = faces_text
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid("face count is not a number"))?;
        if faces == 0 {
            return Err(invalid("dice need at least one face"));
        }

        let expr = Self::new(count, faces, modifier);
        if expr.max() > i32::MAX as i64 || expr.min() < i32::MIN as i64 {
            return Err(invalid("total does not fit a 32-bit integer"));
        }
        Ok(expr)
    }
}

impl TryFrom<String> for DiceExpression {
    type Error = DelverError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<DiceExpression> for String {
    fn from(expr: DiceExpression) -> Self {
        expr.to_string()
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::random::SequenceRandom;
    use crate::SeededRandom;

    #[test]
    fn test_roll_keeps_faces_and_total() {
        let mut rng = SequenceRandom::new(vec![3, 1, 6]);
        let result = roll(3, 6, &mut rng).unwrap();
        assert_eq!(result.faces, vec![3, 1, 6]);
        assert_eq!(result.total, 10);
        assert_eq!(result.trace(), "3, 1, 6");
    }

    #[test]
    fn test_roll_zero_dice() {
        let mut rng = SeededRandom::new(1);
        let result = roll(0, 100, &mut rng).unwrap();
        assert!(result.faces.is_empty());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_roll_rejects_faceless_dice() {
        let mut rng = SeededRandom::new(1);
        assert!(matches!(
            roll(2, 0, &mut rng),
            Err(DelverError::InvalidDice(_))
        ));
    }

    #[test]
    fn test_count_at_least() {
        let result = DiceRoll {
            faces: vec![10, 50, 51, 99],
            total: 210,
        };
        assert_eq!(result.count_at_least(50), 3);
        assert_eq!(result.count_at_least(0), 4);
        assert_eq!(result.count_at_least(100), 0);
    }

    #[test]
    fn test_parse_expressions() {
        assert_eq!(
            "2d5".parse::<DiceExpression>().unwrap(),
            DiceExpression::new(2, 5, 0)
        );
        assert_eq!(
            "1D3+2".parse::<DiceExpression>().unwrap(),
            DiceExpression::new(1, 3, 2)
        );
        assert_eq!(
            " 25d3 - 4 ".parse::<DiceExpression>().unwrap(),
            DiceExpression::new(25, 3, -4)
        );
        assert_eq!(
            "d20".parse::<DiceExpression>().unwrap(),
            DiceExpression::new(1, 20, 0)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "5", "xd6", "2dx", "2d0", "2d6+", "2d6+q", "-1d6"] {
            assert!(
                text.parse::<DiceExpression>().is_err(),
                "expected '{}' to fail",
                text
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(DiceExpression::new(2, 5, 0).to_string(), "2d5");
        assert_eq!(DiceExpression::new(1, 3, 2).to_string(), "1d3+2");
        assert_eq!(DiceExpression::new(10, 4, -1).to_string(), "10d4-1");
    }

    #[test]
    fn test_expression_roll_applies_modifier() {
        let mut rng = SequenceRandom::new(vec![4, 2]);
        let expr = DiceExpression::new(2, 6, 3);
        assert_eq!(expr.roll(&mut rng).unwrap(), 9);
    }

    #[test]
    fn test_expression_roll_within_bounds() {
        let mut rng = SeededRandom::new(77);
        let expr: DiceExpression = "10d4".parse().unwrap();
        for _ in 0..200 {
            let total = expr.roll(&mut rng).unwrap() as i64;
            assert!(total >= expr.min() && total <= expr.max());
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_totals() {
        for text in ["3d2000000000", "2d2147483647", "1d6+2147483647"] {
            assert!(matches!(
                text.parse::<DiceExpression>(),
                Err(DelverError::InvalidDice(_))
            ));
        }
        assert!("1d2147483647".parse::<DiceExpression>().is_ok());
    }

    #[test]
    fn test_roll_overflow_is_an_error() {
        let mut rng = SequenceRandom::new(vec![i32::MAX]);
        assert!(matches!(
            roll(2, i32::MAX as u32, &mut rng),
            Err(DelverError::InvalidDice(_))
        ));

        let mut rng = SequenceRandom::new(vec![2_000_000_000]);
        let expr = DiceExpression::new(3, 2_000_000_000, 0);
        assert!(matches!(expr.roll(&mut rng), Err(DelverError::InvalidDice(_))));
    }
}
