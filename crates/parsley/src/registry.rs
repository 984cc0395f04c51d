//! The catalogue of operator tokens, node constructors and functions a
//! parser consults.

use crate::error::EvalError;
use crate::functions::{builtins, Function};
use crate::node::Node;
use crate::operators::{BinaryOperator, Precedence, UnaryOperator};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds the node for a registered prefix token from its parsed operand.
pub type UnaryConstructor = Arc<dyn Fn(Node) -> Node + Send + Sync>;

/// Builds the node for a registered infix token from its parsed operands.
pub type BinaryConstructor = Arc<dyn Fn(Node, Node) -> Node + Send + Sync>;

/// Tokens the lexer recognises before any registration.
pub const BUILTIN_TOKENS: &[&str] = &[
    "+", "-", "*", "^", "/", "(", ")", "\"", ",", "==", ">", "<", "&&", "||",
];

#[derive(Clone)]
pub struct BinaryEntry {
    pub precedence: Precedence,
    pub constructor: BinaryConstructor,
}

/// Operator and function catalogue.
///
/// Registration needs `&mut self`; once built, a registry is shared read-only
/// by every parse.
#[derive(Clone)]
pub struct Registry {
    known_tokens: Vec<String>,
    unary: HashMap<String, UnaryConstructor>,
    binary: HashMap<String, BinaryEntry>,
    functions: HashMap<String, Function>,
}

impl Registry {
    /// A registry seeded with the built-in tokens and functions.
    pub fn new() -> Self {
        let mut registry = Registry {
            known_tokens: BUILTIN_TOKENS.iter().map(|t| t.to_string()).collect(),
            unary: HashMap::new(),
            binary: HashMap::new(),
            functions: HashMap::new(),
        };
        for (name, function) in builtins() {
            registry.functions.insert(name.to_string(), function);
        }
        registry
    }

    fn add_token(&mut self, token: &str) {
        if !self.known_tokens.iter().any(|t| t == token) {
            self.known_tokens.push(token.to_string());
        }
    }

    /// Registers a prefix token. The constructor receives the parsed operand.
    pub fn register_unary<F>(&mut self, token: impl Into<String>, constructor: F)
    where
        F: Fn(Node) -> Node + Send + Sync + 'static,
    {
        let token = token.into();
        log::trace!("registering unary token {:?}", token);
        self.add_token(&token);
        self.unary.insert(token, Arc::new(constructor));
    }

    /// Registers an infix token at the multiplicative tier.
    pub fn register_binary<F>(&mut self, token: impl Into<String>, constructor: F)
    where
        F: Fn(Node, Node) -> Node + Send + Sync + 'static,
    {
        self.register_binary_with_precedence(token, Precedence::Multiplicative, constructor);
    }

    /// Registers an infix token at the given tier.
    pub fn register_binary_with_precedence<F>(
        &mut self,
        token: impl Into<String>,
        precedence: Precedence,
        constructor: F,
    ) where
        F: Fn(Node, Node) -> Node + Send + Sync + 'static,
    {
        let token = token.into();
        log::trace!("registering binary token {:?} at {:?}", token, precedence);
        self.add_token(&token);
        self.binary.insert(
            token,
            BinaryEntry {
                precedence,
                constructor: Arc::new(constructor),
            },
        );
    }

    /// Registers a prefix operator whose behaviour lives in a
    /// `UnaryOperator` implementation.
    pub fn register_unary_operator<O>(&mut self, operator: O)
    where
        O: UnaryOperator + 'static,
    {
        let operator: Arc<dyn UnaryOperator> = Arc::new(operator);
        let token = operator.token().to_string();
        self.register_unary(token, move |operand| Node::Unary {
            operator: Arc::clone(&operator),
            operand: Box::new(operand),
        });
    }

    /// Registers an infix operator whose behaviour lives in a
    /// `BinaryOperator` implementation, at the tier it reports.
    pub fn register_binary_operator<O>(&mut self, operator: O)
    where
        O: BinaryOperator + 'static,
    {
        let operator: Arc<dyn BinaryOperator> = Arc::new(operator);
        let token = operator.token().to_string();
        let precedence = operator.precedence();
        self.register_binary_with_precedence(token, precedence, move |left, right| Node::Binary {
            operator: Arc::clone(&operator),
            left: Box::new(left),
            right: Box::new(right),
        });
    }

    /// Adds or replaces a function. The last registration for a name wins.
    pub fn register_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: for<'a> Fn(&[Value<'a>]) -> Result<Value<'a>, EvalError> + Send + Sync + 'static,
    {
        let name = name.into();
        log::trace!("registering function {:?}", name);
        self.functions.insert(name, Function::new(function));
    }

    pub fn unary(&self, token: &str) -> Option<&UnaryConstructor> {
        self.unary.get(token)
    }

    pub fn binary(&self, token: &str) -> Option<&BinaryEntry> {
        self.binary.get(token)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn known_tokens(&self) -> &[String] {
        &self.known_tokens
    }

    pub fn is_known_token(&self, token: &str) -> bool {
        self.known_tokens.iter().any(|t| t == token)
    }

    /// True if some known token begins with `prefix`.
    pub fn is_token_prefix(&self, prefix: &str) -> bool {
        self.known_tokens.iter().any(|t| t.starts_with(prefix))
    }

    /// Length in characters of the longest known token.
    pub fn max_token_len(&self) -> usize {
        self.known_tokens
            .iter()
            .map(|t| t.chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("Registry")
            .field("known_tokens", &self.known_tokens)
            .field("unary", &self.unary.keys().collect::<Vec<_>>())
            .field("binary", &self.binary.keys().collect::<Vec<_>>())
            .field("functions", &functions)
            .finish()
    }
}
