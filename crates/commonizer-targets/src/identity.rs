//! Canonical identity strings.
//!
//! Every target has a lossless textual form:
//! - leaf with a platform — the platform name (e.g. `linux_x64`);
//! - leaf without a platform — the sentinel `*`;
//! - shared — the sub-targets' identity strings, sorted lexicographically
//!   and joined with `, ` inside parentheses, e.g.
//!   `(linux_x64, macos_x64)` or `((ios_arm64, ios_x64), linux_x64)`.
//!
//! Sorting makes the string independent of construction order; the
//! delimiter characters are forbidden in platform names, so no escaping is
//! needed. [`parse_identity_string`] is the exact inverse for well-formed
//! (non-empty) targets and accepts sub-targets in any order.

use std::fmt;

use crate::error::{Result, TargetError};
use crate::platform::PlatformRegistry;
use crate::target::{CommonizerTarget, LeafTarget, SharedTarget};

/// Identity-string form of a leaf target with no associated platform.
pub const NO_PLATFORM_SENTINEL: &str = "*";

impl fmt::Display for LeafTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.platform() {
            Some(platform) => f.write_str(platform.name()),
            None => f.write_str(NO_PLATFORM_SENTINEL),
        }
    }
}

impl fmt::Display for SharedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self
            .targets()
            .iter()
            .map(|sub| sub.identity_string())
            .collect();
        parts.sort();
        write!(f, "({})", parts.join(", "))
    }
}

impl fmt::Display for CommonizerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonizerTarget::Leaf(leaf) => leaf.fmt(f),
            CommonizerTarget::Shared(shared) => shared.fmt(f),
        }
    }
}

impl CommonizerTarget {
    /// The canonical textual form of this target.
    pub fn identity_string(&self) -> String {
        self.to_string()
    }
}

impl SharedTarget {
    /// The canonical textual form of this target.
    pub fn identity_string(&self) -> String {
        self.to_string()
    }
}

impl LeafTarget {
    /// The canonical textual form of this target.
    pub fn identity_string(&self) -> String {
        self.to_string()
    }
}

/// Parse an identity string back into a target.
///
/// Platform names are resolved through `registry`; an unknown name is a
/// [`TargetError::UnknownPlatform`]. Sub-targets may appear in any order,
/// the parsed value is order-normalized by construction.
pub fn parse_identity_string(
    input: &str,
    registry: &dyn PlatformRegistry,
) -> Result<CommonizerTarget> {
    let mut parser = Parser {
        input,
        bytes: input.as_bytes(),
        pos: 0,
        registry,
    };
    parser.skip_spaces();
    let target = parser.parse_target()?;
    parser.skip_spaces();
    if parser.pos != parser.bytes.len() {
        return Err(parser.error("trailing characters after target"));
    }
    Ok(target)
}

struct Parser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    registry: &'a dyn PlatformRegistry,
}

impl Parser<'_> {
    fn parse_target(&mut self) -> Result<CommonizerTarget> {
        match self.peek() {
            Some(b'(') => self.parse_shared(),
            Some(_) => self.parse_leaf(),
            None => Err(self.error("expected a target")),
        }
    }

    fn parse_shared(&mut self) -> Result<CommonizerTarget> {
        self.pos += 1; // consume '('
        let mut sub_targets = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(b')') if sub_targets.is_empty() => {
                    return Err(self.error("empty shared target group"));
                }
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(b',') if sub_targets.is_empty() => {
                    return Err(self.error("expected a target before ','"));
                }
                Some(b',') => {
                    self.pos += 1;
                    self.skip_spaces();
                    sub_targets.push(self.parse_target()?);
                }
                Some(_) if sub_targets.is_empty() => {
                    sub_targets.push(self.parse_target()?);
                }
                Some(_) => {
                    return Err(self.error("expected ',' or ')'"));
                }
                None => {
                    return Err(self.error("unclosed '('"));
                }
            }
        }
        // Non-empty is established above.
        CommonizerTarget::shared(sub_targets)
    }

    fn parse_leaf(&mut self) -> Result<CommonizerTarget> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let c = b as char;
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '*') {
                self.pos += 1;
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected a platform name"));
        }
        let name = &self.input[start..self.pos];
        if name == NO_PLATFORM_SENTINEL {
            return Ok(CommonizerTarget::leaf_without_platform());
        }
        let platform = self.registry.resolve(name)?;
        Ok(CommonizerTarget::leaf(platform))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn error(&self, detail: &str) -> TargetError {
        TargetError::Parse {
            input: self.input.to_string(),
            position: self.pos,
            detail: detail.to_string(),
        }
    }
}
