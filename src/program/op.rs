//! Function nodes and function sets

use std::fmt;
use std::str::FromStr;

use rand::Rng;

use crate::error::{GpError, GpResult};

/// Operator applied by a function node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mul,
    /// Protected division (1 when the denominator is zero)
    Div,
    /// Power
    Pow,
    /// Minimum of two values
    Min,
    /// Maximum of two values
    Max,
    /// Cosine
    Cos,
    /// Sine
    Sin,
    /// Exponential
    Exp,
    /// Natural logarithm
    Log,
    /// Absolute value
    Abs,
    /// Negation
    Neg,
    /// Square root
    Sqrt,
}

impl Op {
    /// Every available operator
    pub const ALL: [Op; 14] = [
        Op::Add,
        Op::Sub,
        Op::Mul,
        Op::Div,
        Op::Pow,
        Op::Min,
        Op::Max,
        Op::Cos,
        Op::Sin,
        Op::Exp,
        Op::Log,
        Op::Abs,
        Op::Neg,
        Op::Sqrt,
    ];

    /// Number of operands
    pub fn arity(self) -> usize {
        match self {
            Op::Add | Op::Sub | Op::Mul | Op::Div | Op::Pow | Op::Min | Op::Max => 2,
            Op::Cos | Op::Sin | Op::Exp | Op::Log | Op::Abs | Op::Neg | Op::Sqrt => 1,
        }
    }

    /// Name used in function sets and serialized programs
    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Pow => "pow",
            Op::Min => "min",
            Op::Max => "max",
            Op::Cos => "cos",
            Op::Sin => "sin",
            Op::Exp => "exp",
            Op::Log => "log",
            Op::Abs => "abs",
            Op::Neg => "neg",
            Op::Sqrt => "sqrt",
        }
    }

    /// Apply to one value per operand
    pub fn apply(self, args: &[f64]) -> f64 {
        match self {
            Op::Add => args[0] + args[1],
            Op::Sub => args[0] - args[1],
            Op::Mul => args[0] * args[1],
            Op::Div => {
                if args[1] == 0.0 {
                    1.0
                } else {
                    args[0] / args[1]
                }
            }
            Op::Pow => args[0].powf(args[1]),
            Op::Min => args[0].min(args[1]),
            Op::Max => args[0].max(args[1]),
            Op::Cos => args[0].cos(),
            Op::Sin => args[0].sin(),
            Op::Exp => args[0].exp(),
            Op::Log => args[0].ln(),
            Op::Abs => args[0].abs(),
            Op::Neg => -args[0],
            Op::Sqrt => args[0].sqrt(),
        }
    }

    /// Apply element-wise to one column per operand
    pub fn apply_columns(self, args: &[Vec<f64>]) -> Vec<f64> {
        match self.arity() {
            1 => args[0].iter().map(|&a| self.apply(&[a])).collect(),
            _ => args[0]
                .iter()
                .zip(&args[1])
                .map(|(&a, &b)| self.apply(&[a, b]))
                .collect(),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Op {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        if name == "sum" {
            return Ok(Op::Add);
        }
        Op::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| GpError::UnknownFunction(s.trim().to_string()))
    }
}

/// Operators a program may be built from
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSet {
    ops: Vec<Op>,
}

impl FunctionSet {
    /// Parse a comma-separated list of operator names, e.g. `"add,sub,mul,div"`
    pub fn parse(spec: &str) -> GpResult<Self> {
        let mut ops = Vec::new();
        for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let op: Op = name.parse()?;
            if !ops.contains(&op) {
                ops.push(op);
            }
        }
        if ops.is_empty() {
            return Err(GpError::InvalidConfiguration(
                "function set is empty".to_string(),
            ));
        }
        Ok(Self { ops })
    }

    /// Build from an explicit operator list
    pub fn new(ops: Vec<Op>) -> GpResult<Self> {
        if ops.is_empty() {
            return Err(GpError::InvalidConfiguration(
                "function set is empty".to_string(),
            ));
        }
        Ok(Self { ops })
    }

    /// Operators in this set
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Pick any operator uniformly
    pub fn random<R: Rng>(&self, rng: &mut R) -> Op {
        self.ops[rng.gen_range(0..self.ops.len())]
    }

    /// Pick an operator with the given arity, if the set has one
    pub fn random_with_arity<R: Rng>(&self, arity: usize, rng: &mut R) -> Option<Op> {
        let candidates: Vec<Op> = self
            .ops
            .iter()
            .copied()
            .filter(|op| op.arity() == arity)
            .collect();
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }
}
