// src/content/render.rs

//! HTML rendering of the document tree.

use crate::content::{Document, Element, Embed, Node};

const VOID_ELEMENTS: &[&str] = &["br", "hr", "img"];

impl Document {
    /// Render the document body as an HTML fragment.
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, false, &mut out);
        out
    }
}

/// `inline` is set when the nodes sit inside phrasing content such as a
/// paragraph, where block markup is not allowed.
fn render_nodes(nodes: &[Node], inline: bool, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(&escape_html(text)),
            Node::Html(html) => out.push_str(html),
            Node::Element(element) => render_element(element, out),
            Node::Embed(embed) if inline => render_inline_embed(embed, out),
            Node::Embed(embed) => render_embed(embed, out),
        }
    }
}

fn render_element(element: &Element, out: &mut String) {
    if element.name == "img" {
        out.push_str("<img");
        push_attrs(&element.attrs, out);
        out.push_str(&format!(" alt=\"{}\"/>", escape_html(&element.text())));
        return;
    }

    out.push('<');
    out.push_str(&element.name);
    if element.name != "pre" {
        push_attrs(&element.attrs, out);
    }
    if VOID_ELEMENTS.contains(&element.name.as_str()) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    if element.name == "pre" {
        match element.attr("data-lang") {
            Some(lang) => out.push_str(&format!("<code class=\"language-{}\">", escape_html(lang))),
            None => out.push_str("<code>"),
        }
        render_nodes(&element.children, true, out);
        out.push_str("</code></pre>");
        return;
    }

    render_nodes(&element.children, !is_flow_container(&element.name), out);
    out.push_str(&format!("</{}>", element.name));

    if is_block(&element.name) {
        out.push('\n');
    }
}

/// Render an embed from its resolved attributes. Without any, the embed
/// degrades to a plain link.
fn render_embed(embed: &Embed, out: &mut String) {
    let url = escape_html(&embed.url);

    if let Some(html) = embed.attributes.get("html") {
        out.push_str(html);
    } else if let Some(uri) = embed.attributes.get("uri") {
        out.push_str(&format!(
            "<blockquote class=\"bluesky-embed\" data-bluesky-uri=\"{}\"><p><a href=\"{url}\">{url}</a></p></blockquote>",
            escape_html(uri)
        ));
    } else {
        out.push_str(&format!(
            "<p class=\"social-embed\"><a href=\"{url}\">{url}</a></p>"
        ));
    }
}

/// Embed inside a paragraph or other phrasing content.
fn render_inline_embed(embed: &Embed, out: &mut String) {
    let url = escape_html(&embed.url);

    if let Some(html) = embed.attributes.get("html") {
        out.push_str(html);
    } else if let Some(uri) = embed.attributes.get("uri") {
        out.push_str(&format!(
            "<span class=\"bluesky-embed\" data-bluesky-uri=\"{}\"><a href=\"{url}\">{url}</a></span>",
            escape_html(uri)
        ));
    } else {
        out.push_str(&format!(
            "<span class=\"social-embed\"><a href=\"{url}\">{url}</a></span>"
        ));
    }
}

fn push_attrs(attrs: &[(String, String)], out: &mut String) {
    for (name, value) in attrs {
        out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
    }
}

fn is_flow_container(name: &str) -> bool {
    matches!(name, "blockquote" | "li" | "div" | "td" | "th")
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote" | "ul" | "ol" | "li"
            | "table" | "thead" | "tr" | "div"
    )
}

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
