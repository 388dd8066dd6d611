//! Footer markup: one stylesheet plus an overlay block per eligible popup.

use std::fmt::Write;

use crate::descriptor::PopupDescriptor;

#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    class_prefix: String,
}

impl MarkupRenderer {
    pub fn new(class_prefix: impl Into<String>) -> Self {
        Self {
            class_prefix: class_prefix.into(),
        }
    }

    pub fn class_prefix(&self) -> &str {
        &self.class_prefix
    }

    /// Render the stylesheet followed by every overlay. Returns an empty
    /// string when there is nothing to show.
    pub fn render_block(&self, descriptors: &[PopupDescriptor]) -> String {
        if descriptors.is_empty() {
            return String::new();
        }
        let mut out = self.stylesheet();
        for descriptor in descriptors {
            out.push_str(&self.render_overlay(descriptor));
        }
        out
    }

    pub fn render_overlay(&self, descriptor: &PopupDescriptor) -> String {
        let p = &self.class_prefix;
        let mut attrs = String::new();
        for (name, value) in descriptor.attributes() {
            let _ = write!(attrs, "\n     {name}=\"{}\"", html_escape(&value));
        }

        format!(
            r#"<div class="{p}-popup-overlay" id="{p}-popup-overlay-{id}"{attrs}>
  <div class="{p}-popup-content {p}-position-{position}">
    <button class="{p}-popup-close">X</button>
    <div class="{p}-popup-inner-content">
      {content}
    </div>
  </div>
</div>
"#,
            id = descriptor.id,
            position = descriptor.position.as_str(),
            content = descriptor.content,
        )
    }

    pub fn stylesheet(&self) -> String {
        let p = &self.class_prefix;
        format!(
            r#"<style>
.{p}-popup-overlay {{ position: fixed; top: 0; left: 0; width: 100%; height: 100%; background: rgba(0,0,0,0.7); display: none; justify-content: center; align-items: center; z-index: 9999; }}
.{p}-popup-content {{ background: #fff; padding: 20px; position: relative; border-radius: 5px; height: 100%; max-width: 90%; max-height: 90%; }}
.{p}-popup-close {{ position: absolute; top: 0; right: 0; background: transparent; border: none; padding: 5px; cursor: pointer; }}
.{p}-popup-inner-content, .{p}-popup-inner-content img {{ height: 100%; }}
.{p}-position-center {{ margin: auto; }}
.{p}-position-left {{ margin: auto auto auto 0; }}
.{p}-position-right {{ margin: auto 0 auto auto; }}
.{p}-position-top {{ align-self: flex-start; }}
.{p}-position-bottom {{ align-self: flex-end; }}
@keyframes {p}-zoom-in {{ from {{ transform: scale(0.5); opacity: 0; }} to {{ transform: scale(1); opacity: 1; }} }}
@keyframes {p}-zoom-out {{ from {{ transform: scale(1); opacity: 1; }} to {{ transform: scale(0.5); opacity: 0; }} }}
@keyframes {p}-slide-left-in {{ from {{ transform: translateX(-100%); opacity: 0; }} to {{ transform: translateX(0); opacity: 1; }} }}
@keyframes {p}-slide-left-out {{ from {{ transform: translateX(0); opacity: 1; }} to {{ transform: translateX(-100%); opacity: 0; }} }}
@keyframes {p}-slide-top-in {{ from {{ transform: translateY(-100%); opacity: 0; }} to {{ transform: translateY(0); opacity: 1; }} }}
@keyframes {p}-slide-top-out {{ from {{ transform: translateY(0); opacity: 1; }} to {{ transform: translateY(-100%); opacity: 0; }} }}
.{p}-show-zoom-in {{ animation: {p}-zoom-in 0.5s forwards; }}
.{p}-show-slide-left {{ animation: {p}-slide-left-in 0.5s forwards; }}
.{p}-show-slide-top {{ animation: {p}-slide-top-in 0.5s forwards; }}
.{p}-hide-zoom-out {{ animation: {p}-zoom-out 0.5s forwards; }}
.{p}-hide-slide-left {{ animation: {p}-slide-left-out 0.5s forwards; }}
.{p}-hide-slide-top {{ animation: {p}-slide-top-out 0.5s forwards; }}
</style>
"#
        )
    }
}

/// Escape a value for use inside a double-quoted attribute.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}
