//! Code export
//!
//! Renders the configured animations as source for an animation library.
//! Pure functions of the config list.

use std::collections::HashMap;
use std::fmt::Write;

use ab_ipc::{AnimationType, SlideDirection};
use serde::{Deserialize, Serialize};

use crate::AnimationConfig;

const EMPTY: &str = "// No animations to export";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    FramerMotion,
    Gsap,
}

/// Render `animations` in `format`
pub fn generate(animations: &[AnimationConfig], format: ExportFormat) -> String {
    if animations.is_empty() {
        return EMPTY.to_string();
    }
    match format {
        ExportFormat::FramerMotion => framer_motion(animations),
        ExportFormat::Gsap => gsap(animations),
    }
}

/// Start and end values of the animated properties
struct Keyframes {
    hidden: Vec<(&'static str, f64)>,
    visible: Vec<(&'static str, f64)>,
}

fn keyframes(config: &AnimationConfig, rotate_key: &'static str) -> Keyframes {
    let mut hidden = vec![("opacity", 0.0)];
    let mut visible = vec![("opacity", 1.0)];
    match config.preset.kind {
        AnimationType::Fade | AnimationType::TextReveal => {}
        AnimationType::Slide | AnimationType::Stagger => {
            let direction = config.effective_direction().unwrap_or(SlideDirection::Up);
            let (x, y) = direction.start_offset(50.0);
            if direction.is_vertical() {
                hidden.push(("y", y));
                visible.push(("y", 0.0));
            } else {
                hidden.push(("x", x));
                visible.push(("x", 0.0));
            }
        }
        AnimationType::Scale => {
            hidden.push(("scale", 0.0));
            visible.push(("scale", 1.0));
        }
        AnimationType::Rotate => {
            hidden.push((rotate_key, -180.0));
            visible.push((rotate_key, 0.0));
        }
    }
    Keyframes { hidden, visible }
}

fn object(props: &[(&str, f64)]) -> String {
    let body: Vec<String> = props.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
    format!("{{ {} }}", body.join(", "))
}

/// JS string literal (JSON strings are valid JS)
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// camelCase identifier derived from an element id.
///
/// `cta-button` -> `ctaButton`, `h1.hero` -> `h1Hero`. Falls back to
/// `element` when nothing usable remains, and prefixes `el` when the result
/// would start with a digit.
pub fn identifier(element_id: &str) -> String {
    let mut ident = String::new();
    for word in element_id
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if ident.is_empty() {
                ident.push(first.to_ascii_lowercase());
            } else {
                ident.push(first.to_ascii_uppercase());
            }
            ident.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    if ident.is_empty() {
        return "element".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "el");
    }
    ident
}

fn framer_motion(animations: &[AnimationConfig]) -> String {
    let mut out = String::from("import { motion } from 'framer-motion';\n");
    let mut used: HashMap<String, usize> = HashMap::new();

    for config in animations {
        let base = identifier(&config.element_id);
        let count = used.entry(base.clone()).or_insert(0);
        *count += 1;
        let name = if *count == 1 {
            format!("{}Variants", base)
        } else {
            format!("{}{}Variants", base, count)
        };

        let frames = keyframes(config, "rotate");
        let _ = write!(
            out,
            "\nconst {name} = {{\n  hidden: {hidden},\n  visible: {visible}\n}};\n\n\
             <motion.div\n  id={id}\n  variants={{{name}}}\n  initial=\"hidden\"\n  animate=\"visible\"\n  \
             transition={{{{\n    duration: {duration},\n    delay: {delay},\n    ease: {ease}\n  }}}}\n>\n  \
             {{/* Your content here */}}\n</motion.div>\n",
            name = name,
            hidden = object(&frames.hidden),
            visible = object(&frames.visible),
            id = js_string(&config.element_id),
            duration = config.duration,
            delay = config.delay,
            ease = js_string(&config.easing),
        );
    }
    out
}

fn gsap(animations: &[AnimationConfig]) -> String {
    let mut out = String::from("import { gsap } from 'gsap';\n\nconst tl = gsap.timeline();\n\n");
    for config in animations {
        let frames = keyframes(config, "rotation");
        let mut to = frames.visible.iter().map(|(k, v)| format!("{}: {}", k, v)).collect::<Vec<_>>();
        to.push(format!("duration: {}", config.duration));
        to.push(format!("ease: {}", js_string(&config.easing)));
        let _ = writeln!(
            out,
            "tl.fromTo({}, {}, {{ {} }}, {});",
            js_string(&config.selector),
            object(&frames.hidden),
            to.join(", "),
            config.delay
        );
    }
    out.push_str("\n// Play the timeline\ntl.play();\n");
    out
}
