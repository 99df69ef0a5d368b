use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A renderable node handed to the host UI.
///
/// The runtime only decides *what* to render; the host maps element kinds to
/// its own widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    /// A widget of the given kind with properties and nested nodes.
    Element {
        kind: String,
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        props: Map<String, Value>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<RenderNode>,
    },
    Text { text: String },
    /// Placeholder for a schema type this build does not know about.
    Unknown {
        #[serde(rename = "schemaType")]
        schema_type: String,
    },
    /// Placeholder for a known schema type whose fields failed to decode.
    Invalid {
        #[serde(rename = "schemaType")]
        schema_type: String,
        message: String,
    },
    Loading,
    Empty,
    Failure { message: String, transient: bool },
}

impl RenderNode {
    pub fn element(kind: impl Into<String>) -> Self {
        Self::Element {
            kind: kind.into(),
            props: Map::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn unknown(schema_type: impl Into<String>) -> Self {
        Self::Unknown {
            schema_type: schema_type.into(),
        }
    }

    pub fn invalid(schema_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            schema_type: schema_type.into(),
            message: message.into(),
        }
    }

    /// Sets a property. No-op on non-element nodes.
    pub fn with_prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Element { props, .. } = &mut self {
            props.insert(name.into(), value.into());
        }
        self
    }

    /// Sets a property only when a value is present.
    pub fn with_opt_prop(self, name: impl Into<String>, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with_prop(name, value),
            None => self,
        }
    }

    /// Appends a child. No-op on non-element nodes.
    pub fn with_child(mut self, child: RenderNode) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Element { kind, .. } => Some(kind.as_str()),
            _ => None,
        }
    }

    pub fn prop(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Element { props, .. } => props.get(name),
            _ => None,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            Self::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Schema types of every `Unknown` placeholder in the tree, depth-first.
    pub fn unknown_schema_types(&self) -> Vec<&str> {
        let mut found = Vec::new();
        self.collect_unknown(&mut found);
        found
    }

    fn collect_unknown<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            Self::Unknown { schema_type } => found.push(schema_type.as_str()),
            Self::Element { children, .. } => {
                for child in children {
                    child.collect_unknown(found);
                }
            }
            _ => {}
        }
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let indent = "  ".repeat(depth);
        match self {
            Self::Element {
                kind,
                props,
                children,
            } => {
                write!(f, "{indent}{kind}")?;
                if !props.is_empty() {
                    write!(f, " {}", Value::Object(props.clone()))?;
                }
                writeln!(f)?;
                for child in children {
                    child.write_outline(f, depth + 1)?;
                }
                Ok(())
            }
            Self::Text { text } => writeln!(f, "{indent}\"{text}\""),
            Self::Unknown { schema_type } => writeln!(f, "{indent}<unknown {schema_type}>"),
            Self::Invalid {
                schema_type,
                message,
            } => writeln!(f, "{indent}<invalid {schema_type}: {message}>"),
            Self::Loading => writeln!(f, "{indent}<loading>"),
            Self::Empty => writeln!(f, "{indent}<empty>"),
            Self::Failure { message, transient } => {
                let kind = if *transient { "transient" } else { "permanent" };
                writeln!(f, "{indent}<failure ({kind}): {message}>")
            }
        }
    }
}

/// Indented outline, one node per line.
impl fmt::Display for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}
