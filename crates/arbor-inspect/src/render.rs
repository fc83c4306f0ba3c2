//! Plain-text tree rendering.
//!
//! ```text
//! root
//! ├─ a: 1
//! ├─ b
//! │   ├─ [0]: true
//! │   └─ [1]: null
//! └─ c.d: "x"
//! ```
//!
//! Mapping children are labelled by key, list children by `[index]`. A
//! container already being rendered further up renders as `<cycle>`.

use arbor_diff::TreeDiff;
use arbor_types::Tree;
use serde::{Deserialize, Serialize};

/// Marker printed in place of a container that is its own ancestor.
pub const CYCLE_MARKER: &str = "<cycle>";

/// Connector glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Unicode,
    Ascii,
}

struct Glyphs {
    tee: &'static str,
    corner: &'static str,
    pipe: &'static str,
    blank: &'static str,
}

impl LineStyle {
    fn glyphs(self) -> Glyphs {
        match self {
            LineStyle::Unicode => Glyphs {
                tee: "├─ ",
                corner: "└─ ",
                pipe: "│   ",
                blank: "    ",
            },
            LineStyle::Ascii => Glyphs {
                tee: "|-- ",
                corner: "`-- ",
                pipe: "|   ",
                blank: "    ",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Label of the root line.
    pub name: String,
    /// Fold chains of single-key mappings into one dotted label.
    pub compact: bool,
    pub style: LineStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            compact: true,
            style: LineStyle::Unicode,
        }
    }
}

/// Render `tree` as indented text, one node per line.
pub fn render_tree(tree: &Tree, options: &RenderOptions) -> String {
    let children = children_of(tree);
    if children.is_empty() {
        return format!("{}: {tree}\n", options.name);
    }

    let mut out = options.name.clone();
    out.push('\n');
    let mut renderer = Renderer {
        options,
        glyphs: options.style.glyphs(),
        ancestors: tree.identity().into_iter().collect(),
        out,
    };
    renderer.children(&children, "");
    renderer.out
}

/// Render the reserved-key view of a diff. An empty diff renders as a single
/// `name: unchanged` line.
pub fn render_diff(diff: &TreeDiff, options: &RenderOptions) -> String {
    if diff.is_empty() {
        return format!("{}: unchanged\n", options.name);
    }
    render_tree(&diff.to_tree(), options)
}

struct Renderer<'a> {
    options: &'a RenderOptions,
    glyphs: Glyphs,
    ancestors: Vec<usize>,
    out: String,
}

impl Renderer<'_> {
    fn line(&mut self, text: String) {
        self.out.push_str(&text);
        self.out.push('\n');
    }

    fn children(&mut self, children: &[(String, Tree)], prefix: &str) {
        for (i, (label, child)) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            let connector = if last { self.glyphs.corner } else { self.glyphs.tee };

            let (label, node) = if self.options.compact {
                self.fold(label.clone(), child.clone())
            } else {
                (label.clone(), child.clone())
            };

            let id = node.identity();
            if id.is_some_and(|id| self.ancestors.contains(&id)) {
                self.line(format!("{prefix}{connector}{label}: {CYCLE_MARKER}"));
                continue;
            }

            let grandchildren = children_of(&node);
            if grandchildren.is_empty() {
                self.line(format!("{prefix}{connector}{label}: {node}"));
                continue;
            }

            self.line(format!("{prefix}{connector}{label}"));
            let indent = if last { self.glyphs.blank } else { self.glyphs.pipe };
            let prefix = format!("{prefix}{indent}");
            self.ancestors.extend(id);
            self.children(&grandchildren, &prefix);
            if id.is_some() {
                self.ancestors.pop();
            }
        }
    }

    /// Follow single-key mappings downward, joining their keys onto `label`.
    /// Stops before any container that is an ancestor or already folded.
    fn fold(&self, mut label: String, mut node: Tree) -> (String, Tree) {
        let mut chain = Vec::new();
        loop {
            let Tree::Map(entries) = &node else { break };
            let next = {
                let entries = entries.borrow();
                if entries.len() != 1 {
                    break;
                }
                entries
                    .iter()
                    .next()
                    .map(|(key, child)| (key.clone(), child.clone()))
            };
            let Some((key, child)) = next else { break };
            let revisits = child
                .identity()
                .is_some_and(|id| self.ancestors.contains(&id) || chain.contains(&id));
            if revisits {
                break;
            }
            chain.push(entries.identity());
            label = format!("{label}.{key}");
            node = child;
        }
        (label, node)
    }
}

fn children_of(tree: &Tree) -> Vec<(String, Tree)> {
    match tree {
        Tree::Map(entries) => entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        Tree::List(items) => items
            .borrow()
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("[{i}]"), v.clone()))
            .collect(),
        _ => Vec::new(),
    }
}
