//! Text and JSON forms of expression trees
//!
//! Text form: `add(x0, mul(1.5, x1))`. Features are written `x<index>` and
//! constants use the shortest representation that parses back to the same
//! `f64`.
//!
//! JSON form: `{"type": "func", "value": "add", "operands": [...]}`,
//! `{"type": "var", "value": 0}` and `{"type": "const", "value": 1.5}`.
//! JSON has no infinities or NaN, so only trees whose constants are all
//! finite have a JSON form; serializing any other tree fails.

use std::fmt;
use std::str::FromStr;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

use super::node::Node;
use super::op::Op;
use crate::error::GpError;

/// Tagged JSON shape of a node
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum NodeRepr {
    Var { value: usize },
    Const {
        #[serde(serialize_with = "finite_f64")]
        value: f64,
    },
    Func { value: String, operands: Vec<NodeRepr> },
}

fn finite_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(S::Error::custom(format!(
            "constant {:?} has no JSON form",
            value
        )));
    }
    serializer.serialize_f64(*value)
}

impl From<Node> for NodeRepr {
    fn from(node: Node) -> Self {
        match node {
            Node::Terminal(feature) => NodeRepr::Var { value: feature },
            Node::Constant(value) => NodeRepr::Const { value },
            Node::Function(op, children) => NodeRepr::Func {
                value: op.name().to_string(),
                operands: children.into_iter().map(NodeRepr::from).collect(),
            },
        }
    }
}

impl TryFrom<NodeRepr> for Node {
    type Error = GpError;

    fn try_from(repr: NodeRepr) -> Result<Self, Self::Error> {
        match repr {
            NodeRepr::Var { value } => Ok(Node::Terminal(value)),
            NodeRepr::Const { value } => Ok(Node::Constant(value)),
            NodeRepr::Func { value, operands } => {
                let op: Op = value.parse()?;
                if operands.len() != op.arity() {
                    return Err(GpError::Parse(format!(
                        "{} takes {} operands, got {}",
                        op,
                        op.arity(),
                        operands.len()
                    )));
                }
                let children = operands
                    .into_iter()
                    .map(Node::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Node::Function(op, children))
            }
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Terminal(feature) => write!(f, "x{}", feature),
            Node::Constant(value) => write!(f, "{:?}", value),
            Node::Function(op, children) => {
                write!(f, "{}(", op)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for Node {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, pos: 0 };
        let node = parser.node()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error("trailing input"));
        }
        Ok(node)
    }
}

/// Recursive-descent parser over the text form
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, message: &str) -> GpError {
        GpError::Parse(format!("{} at offset {} in {:?}", message, self.pos, self.input))
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn expect(&mut self, c: char) -> Result<(), GpError> {
        self.skip_whitespace();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    /// Take characters up to the next delimiter
    fn token(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c == '(' || c == ')' || c == ',' || c.is_whitespace())
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn node(&mut self) -> Result<Node, GpError> {
        self.skip_whitespace();
        let start = self.pos;
        let token = self.token();
        if token.is_empty() {
            return Err(self.error("expected a node"));
        }

        if let Some(index) = token.strip_prefix('x') {
            if let Ok(feature) = index.parse::<usize>() {
                return Ok(Node::Terminal(feature));
            }
        }
        if let Ok(value) = token.parse::<f64>() {
            return Ok(Node::Constant(value));
        }

        let op: Op = token.parse().map_err(|_| {
            self.pos = start;
            self.error(&format!("unknown token {:?}", token))
        })?;
        self.expect('(')?;
        let mut children = Vec::with_capacity(op.arity());
        for i in 0..op.arity() {
            if i > 0 {
                self.expect(',')?;
            }
            children.push(self.node()?);
        }
        self.expect(')')?;
        Ok(Node::Function(op, children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::function(
            Op::Add,
            vec![
                Node::terminal(0),
                Node::function(Op::Mul, vec![Node::constant(1.5), Node::terminal(1)]),
            ],
        )
    }

    #[test]
    fn test_display() {
        assert_eq!(sample().to_string(), "add(x0, mul(1.5, x1))");
        assert_eq!(Node::constant(-2.0).to_string(), "-2.0");
        assert_eq!(
            Node::function(Op::Cos, vec![Node::terminal(12)]).to_string(),
            "cos(x12)"
        );
    }

    #[test]
    fn test_parse_text() {
        let parsed: Node = "add( x0 ,mul(1.5,x1) )".parse().unwrap();
        assert_eq!(parsed, sample());
        let parsed: Node = "sum(-1e-7, neg(x3))".parse().unwrap();
        assert_eq!(
            parsed,
            Node::function(
                Op::Add,
                vec![
                    Node::constant(-1e-7),
                    Node::function(Op::Neg, vec![Node::terminal(3)])
                ]
            )
        );
    }

    #[test]
    fn test_text_round_trip_keeps_constants_exact() {
        let tree = Node::function(
            Op::Sub,
            vec![Node::constant(0.1 + 0.2), Node::constant(f64::MAX)],
        );
        let parsed: Node = tree.to_string().parse().unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "add(x0)", "add(x0, x1", "foo(x0)", "x0 x1", "add(x0, x1, x2)"] {
            assert!(
                matches!(bad.parse::<Node>(), Err(GpError::Parse(_)) | Err(GpError::UnknownFunction(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_json_wire_form() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "func",
                "value": "add",
                "operands": [
                    {"type": "var", "value": 0},
                    {"type": "func", "value": "mul", "operands": [
                        {"type": "const", "value": 1.5},
                        {"type": "var", "value": 1}
                    ]}
                ]
            })
        );
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_rejects_non_finite_constants() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let tree = Node::function(Op::Add, vec![Node::terminal(0), Node::constant(value)]);
            assert!(serde_json::to_string(&tree).is_err());
            // The text form still carries it
            let parsed: Node = tree.to_string().parse().unwrap();
            assert_eq!(parsed.to_string(), tree.to_string());
        }
    }

    #[test]
    fn test_json_arity_mismatch() {
        let json = r#"{"type":"func","value":"div","operands":[{"type":"var","value":0}]}"#;
        assert!(serde_json::from_str::<Node>(json).is_err());
    }
}
