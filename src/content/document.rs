// src/content/document.rs

//! Markdown document tree.
//!
//! Markdown is parsed with pulldown-cmark into an owned tree so that embed
//! nodes can be enriched before rendering. Raw HTML of the form
//! `<social-embed url="...">` becomes an [`Embed`] node.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tag name of the custom embed element.
pub const EMBED_TAG: &str = "social-embed";

/// YAML front matter fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Raw HTML, emitted verbatim
    Html(String),
    Embed(Embed),
}

/// An HTML element produced from a markdown construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

/// A social media embed and the attributes resolved for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub url: String,
    pub attributes: BTreeMap<String, String>,
}

impl Embed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn is_enriched(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A parsed markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub nodes: Vec<Node>,
    /// Markdown source without the front matter block
    pub body: String,
}

impl Document {
    /// Parse markdown with optional YAML front matter.
    pub fn parse(source: &str) -> Result<Self> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;

        let mut builder = TreeBuilder::default();
        let mut metadata: Option<String> = None;
        let mut in_metadata = false;
        let mut body_start = 0;

        for (event, range) in Parser::new_ext(source, options).into_offset_iter() {
            match event {
                Event::Start(Tag::MetadataBlock(_)) => {
                    in_metadata = true;
                    metadata = Some(String::new());
                }
                Event::End(TagEnd::MetadataBlock(_)) => {
                    in_metadata = false;
                    body_start = range.end;
                }
                Event::Text(text) if in_metadata => {
                    if let Some(buffer) = metadata.as_mut() {
                        buffer.push_str(&text);
                    }
                }
                event => builder.push(event),
            }
        }

        let front_matter = match metadata.as_deref().map(str::trim) {
            Some(yaml) if !yaml.is_empty() => serde_yaml::from_str(yaml)?,
            _ => FrontMatter::default(),
        };

        Ok(Self {
            front_matter,
            nodes: builder.finish(),
            body: source[body_start..].trim_start().to_string(),
        })
    }

    /// Front matter title, or the text of the first level-one heading.
    pub fn title(&self) -> Option<String> {
        self.front_matter
            .title
            .clone()
            .or_else(|| first_heading(&self.nodes))
    }

    /// All embed nodes, in document order.
    pub fn embeds(&self) -> Vec<&Embed> {
        let mut out = Vec::new();
        collect_embeds(&self.nodes, &mut out);
        out
    }

    /// All embed nodes, in document order, for enrichment.
    pub fn embeds_mut(&mut self) -> Vec<&mut Embed> {
        let mut out = Vec::new();
        collect_embeds_mut(&mut self.nodes, &mut out);
        out
    }
}

#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Element>,
    html_block: Option<String>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn push(&mut self, event: Event<'_>) {
        if self.stack.is_empty() {
            self.stack.push(Element::new("root"));
        }

        match event {
            Event::Start(Tag::HtmlBlock) => self.html_block = Some(String::new()),
            Event::End(TagEnd::HtmlBlock) => {
                if let Some(html) = self.html_block.take() {
                    self.append_html(&html);
                }
            }
            Event::Html(html) => match self.html_block.as_mut() {
                Some(buffer) => buffer.push_str(&html),
                None => self.append_html(&html),
            },
            Event::InlineHtml(html) => {
                if !is_embed_close(&html) {
                    self.append_html(&html);
                }
            }
            // Header cells arrive directly under the head; wrap them in a row.
            Event::Start(Tag::TableHead) => {
                self.in_table_head = true;
                self.stack.push(Element::new("thead"));
                self.stack.push(Element::new("tr"));
            }
            Event::End(TagEnd::TableHead) => {
                self.in_table_head = false;
                self.close();
                self.close();
            }
            Event::Start(Tag::TableCell) if self.in_table_head => {
                self.stack.push(Element::new("th"))
            }
            Event::Start(tag) => self.stack.push(element_for(tag)),
            Event::End(_) => self.close(),
            Event::Text(text) => self.append(Node::Text(text.into_string())),
            Event::Code(code) => {
                let mut element = Element::new("code");
                element.children.push(Node::Text(code.into_string()));
                self.append(Node::Element(element));
            }
            Event::SoftBreak => self.append(Node::Text("\n".into())),
            Event::HardBreak => self.append(Node::Element(Element::new("br"))),
            Event::Rule => self.append(Node::Element(Element::new("hr"))),
            Event::TaskListMarker(checked) => {
                let checked = if checked { " checked" } else { "" };
                self.append(Node::Html(format!(
                    "<input type=\"checkbox\" disabled{checked}/>"
                )));
            }
            Event::FootnoteReference(name) => {
                self.append(Node::Html(format!("<sup class=\"footnote-ref\">{}</sup>", &*name)));
            }
            Event::InlineMath(text) | Event::DisplayMath(text) => {
                self.append(Node::Text(text.into_string()))
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }

    fn close(&mut self) {
        if self.stack.len() > 1 {
            if let Some(element) = self.stack.pop() {
                self.append(Node::Element(element));
            }
        }
    }

    fn append_html(&mut self, html: &str) {
        for node in html_nodes(html) {
            self.append(node);
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    fn finish(mut self) -> Vec<Node> {
        // Unbalanced input: fold any open elements into their parents.
        while self.stack.len() > 1 {
            if let Some(element) = self.stack.pop() {
                self.append(Node::Element(element));
            }
        }
        self.stack
            .pop()
            .map(|root| root.children)
            .unwrap_or_default()
    }
}

fn element_for(tag: Tag<'_>) -> Element {
    match tag {
        Tag::Paragraph => Element::new("p"),
        Tag::Heading { level, .. } => Element::new(heading_name(level)),
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::CodeBlock(CodeBlockKind::Fenced(lang)) if !lang.is_empty() => {
            Element::new("pre").with_attr("data-lang", lang.into_string())
        }
        Tag::CodeBlock(_) => Element::new("pre"),
        Tag::List(Some(start)) if start != 1 => {
            Element::new("ol").with_attr("start", start.to_string())
        }
        Tag::List(Some(_)) => Element::new("ol"),
        Tag::List(None) => Element::new("ul"),
        Tag::Item => Element::new("li"),
        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Link {
            dest_url, title, ..
        } => {
            let element = Element::new("a").with_attr("href", dest_url.into_string());
            if title.is_empty() {
                element
            } else {
                element.with_attr("title", title.into_string())
            }
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let element = Element::new("img").with_attr("src", dest_url.into_string());
            if title.is_empty() {
                element
            } else {
                element.with_attr("title", title.into_string())
            }
        }
        Tag::Table(_) => Element::new("table"),
        Tag::TableRow => Element::new("tr"),
        Tag::TableCell => Element::new("td"),
        Tag::FootnoteDefinition(name) => {
            Element::new("div").with_attr("class", "footnote").with_attr("id", name.into_string())
        }
        _ => Element::new("div"),
    }
}

fn heading_name(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

fn embed_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse(EMBED_TAG).expect("valid embed selector"))
}

/// Parse a raw HTML snippet as an embed, if it is one.
pub fn parse_embed(html: &str) -> Option<Embed> {
    if !html.to_ascii_lowercase().contains(&format!("<{EMBED_TAG}")) {
        return None;
    }

    let fragment = Html::parse_fragment(html);
    let element = fragment.select(embed_selector()).next()?;
    let url = element
        .value()
        .attr("url")
        .or_else(|| element.value().attr("href"))?
        .trim();

    if url.is_empty() {
        return None;
    }
    Some(Embed::new(url))
}

fn embed_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)<social-embed\b(?:[^>"']|"[^"]*"|'[^']*')*>"#)
            .expect("valid embed open pattern")
    })
}

fn embed_close_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)</social-embed\s*>").expect("valid embed close pattern")
    })
}

fn is_embed_close(html: &str) -> bool {
    embed_close_pattern()
        .find(html.trim())
        .is_some_and(|m| m.start() == 0 && m.end() == html.trim().len())
}

/// Split raw HTML into embed nodes and the markup around them.
///
/// An embed spans its opening tag up to a matching close tag, if one
/// appears before the next embed. Embeds without a URL stay raw HTML.
fn html_nodes(html: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = html;

    while let Some(open) = embed_open_pattern().find(rest) {
        push_html(&mut nodes, &rest[..open.start()]);

        let mut end = open.end();
        if !open.as_str().ends_with("/>") {
            let tail = &rest[end..];
            let next_open = embed_open_pattern()
                .find(tail)
                .map_or(tail.len(), |m| m.start());
            if let Some(close) = embed_close_pattern().find(&tail[..next_open]) {
                end += close.end();
            }
        }

        match parse_embed(open.as_str()) {
            Some(embed) => nodes.push(Node::Embed(embed)),
            None => push_html(&mut nodes, &rest[open.start()..end]),
        }
        rest = &rest[end..];
    }

    push_html(&mut nodes, rest);
    nodes
}

fn push_html(nodes: &mut Vec<Node>, html: &str) {
    if !html.is_empty() {
        nodes.push(Node::Html(html.to_string()));
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => collect_text(&element.children, out),
            Node::Html(_) | Node::Embed(_) => {}
        }
    }
}

fn first_heading(nodes: &[Node]) -> Option<String> {
    nodes.iter().find_map(|node| match node {
        Node::Element(element) if element.name == "h1" => {
            Some(element.text().trim().to_string()).filter(|t| !t.is_empty())
        }
        _ => None,
    })
}

fn collect_embeds<'a>(nodes: &'a [Node], out: &mut Vec<&'a Embed>) {
    for node in nodes {
        match node {
            Node::Embed(embed) => out.push(embed),
            Node::Element(element) => collect_embeds(&element.children, out),
            Node::Text(_) | Node::Html(_) => {}
        }
    }
}

fn collect_embeds_mut<'a>(nodes: &'a mut [Node], out: &mut Vec<&'a mut Embed>) {
    for node in nodes {
        match node {
            Node::Embed(embed) => out.push(embed),
            Node::Element(element) => collect_embeds_mut(&mut element.children, out),
            Node::Text(_) | Node::Html(_) => {}
        }
    }
}
