//! # Display Name Formatter
//!
//! Renders one human-readable name per invocation tuple from a pattern such as
//! `[{index}] {arguments}`.
//!
//! | Placeholder     | Renders                                         |
//! |-----------------|-------------------------------------------------|
//! | `{displayName}` | the operation's display name                    |
//! | `{index}`       | the 1-based invocation number                   |
//! | `{arguments}`   | every argument, joined by the separator         |
//! | `{0}`, `{1}`, … | the argument at that position                   |
//!
//! Single quotes follow message-pattern rules: `''` renders one quote and `'...'` is
//! literal text, so `'{0}'` renders `{0}`. Placeholders that cannot be resolved render as
//! `{<placeholder>: unresolved}`. A pattern that does not parse renders every name as
//! `<display name> [<index>] (invalid display name pattern: <reason>)`.
//!
//! Formatting never fails.

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use tracing::warn;

use crate::expansion::InvocationTuple;
use crate::settings::EngineSettings;
use crate::value::Value;

#[derive(Parser)]
#[grammar = "naming/pattern.pest"]
struct PatternParser;

/// A parsed pattern piece.
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    Placeholder(String),
}

/// Formats invocation tuples into display names. Parses its pattern once.
///
/// # Examples
///
/// ```rust
/// use cartesian_engine::arguments::ArgumentSets;
/// use cartesian_engine::expansion::CartesianProduct;
/// use cartesian_engine::naming::NameFormatter;
///
/// let product = CartesianProduct::new(
///     ArgumentSets::arguments_for_first_parameter(["0", "1"])
///         .arguments_for_next_parameter(["0", "1"]),
/// )
/// .unwrap();
/// let formatter = NameFormatter::new("{index} => first bit: {0} second bit: {1}", "bits");
/// let name = formatter.format(&product.get(1).unwrap());
/// assert_eq!(name, "2 => first bit: 0 second bit: 1");
/// ```
#[derive(Debug, Clone)]
pub struct NameFormatter {
    pattern: String,
    display_name: String,
    separator: String,
    null_literal: String,
    segments: Result<Vec<Segment>, String>,
}

impl NameFormatter {
    pub fn new(pattern: impl Into<String>, display_name: impl Into<String>) -> Self {
        let settings = EngineSettings::default();
        let pattern = pattern.into();
        let display_name = display_name.into();
        let segments = parse_pattern(&pattern);
        if let Err(reason) = &segments {
            warn!(
                display_name = display_name.as_str(),
                pattern = pattern.as_str(),
                %reason,
                "invalid display name pattern, falling back to default names"
            );
        }
        Self {
            pattern,
            display_name,
            separator: settings.arguments_separator,
            null_literal: settings.null_literal,
            segments,
        }
    }

    /// Uses the separator and null literal of `settings`.
    pub fn with_settings(mut self, settings: &EngineSettings) -> Self {
        self.separator = settings.arguments_separator.clone();
        self.null_literal = settings.null_literal.clone();
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether the pattern parsed; invalid patterns still format, as marked fallbacks.
    pub fn is_valid(&self) -> bool {
        self.segments.is_ok()
    }

    pub fn format(&self, tuple: &InvocationTuple) -> String {
        let segments = match &self.segments {
            Ok(segments) => segments,
            Err(reason) => {
                return format!(
                    "{} [{}] (invalid display name pattern: {})",
                    self.display_name,
                    tuple.number(),
                    reason
                )
            }
        };

        let mut name = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => name.push_str(text),
                Segment::Placeholder(placeholder) => self.render_placeholder(&mut name, placeholder, tuple),
            }
        }
        name
    }

    fn render_placeholder(&self, out: &mut String, placeholder: &str, tuple: &InvocationTuple) {
        match placeholder.trim() {
            "displayName" => out.push_str(&self.display_name),
            "index" => out.push_str(&tuple.number().to_string()),
            "arguments" => {
                let rendered: Vec<String> = tuple.arguments().iter().map(|v| self.render(v)).collect();
                out.push_str(&rendered.join(&self.separator));
            }
            key => match key.parse::<usize>().ok().and_then(|i| tuple.get(i)) {
                Some(value) => out.push_str(&self.render(value)),
                None => {
                    out.push('{');
                    out.push_str(placeholder);
                    out.push_str(": unresolved}");
                }
            },
        }
    }

    fn render(&self, value: &Value) -> String {
        match value {
            Value::Null => self.null_literal.clone(),
            other => other.to_string(),
        }
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<Segment>, String> {
    let pairs = PatternParser::parse(Rule::pattern, pattern).map_err(|e| {
        let e = e.renamed_rules(|rule| match rule {
            Rule::placeholder | Rule::argument => "a closing '}'".to_string(),
            Rule::EOI => "end of pattern".to_string(),
            other => format!("{other:?}"),
        });
        let offset = match e.location {
            pest::error::InputLocation::Pos(pos) => pos,
            pest::error::InputLocation::Span((start, _)) => start,
        };
        format!("{} at offset {}", e.variant.message(), offset)
    })?;

    let mut segments: Vec<Segment> = Vec::new();
    for pair in pairs.flat_map(Pair::into_inner) {
        let segment = match pair.as_rule() {
            Rule::escaped_quote => Segment::Text("'".to_string()),
            Rule::quoted | Rule::literal => Segment::Text(unquote(inner_text(&pair))),
            Rule::placeholder => Segment::Placeholder(inner_text(&pair).to_string()),
            _ => continue,
        };
        // Adjacent text pieces merge so the segment list stays small.
        match (segments.last_mut(), segment) {
            (Some(Segment::Text(prev)), Segment::Text(next)) => prev.push_str(&next),
            (_, segment) => segments.push(segment),
        }
    }
    Ok(segments)
}

fn inner_text<'i>(pair: &Pair<'i, Rule>) -> &'i str {
    match pair.as_rule() {
        Rule::quoted | Rule::placeholder => pair
            .clone()
            .into_inner()
            .next()
            .map(|inner| inner.as_str())
            .unwrap_or(""),
        _ => pair.as_str(),
    }
}

fn unquote(text: &str) -> String {
    text.replace("''", "'")
}
