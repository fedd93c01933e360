//! Renders a resolved layout into the live-preview visual tree.
//!
//! Styling mirrors the on-screen preview: neutral text uses `oklch` gray
//! tokens, sizes are authored in `rem`, the contact line is sized in `vw`,
//! date ranges never wrap, and the summary is clamped to a fixed height.
//! Template colors come from the resolved layout only.

use crate::export::visual::{Border, Overflow, Style, TextAlign, VisualNode, VisualTree, WhiteSpace};
use crate::export::font_metrics::FontWeight;
use crate::templates::resolver::{
    EducationItem, ExperienceItem, HeaderArrangement, HeaderBlock, ImageSlot, ProjectItem,
    ResolvedLayout, Section, SectionBody, SkillGroup, PROJECT_LINK_LABEL,
};

const GRAY_900: &str = "oklch(21% 0.034 264.665)";
const GRAY_700: &str = "oklch(37.3% 0.034 259.733)";
const GRAY_600: &str = "oklch(44.6% 0.03 256.802)";
const GRAY_100: &str = "oklch(96.7% 0.003 264.542)";
const WHITE: &str = "#ffffff";

const PAGE_PADDING: f32 = 32.0;
const ASIDE_WIDTH: f32 = 200.0;
const DATE_COLUMN_WIDTH: f32 = 160.0;
const SUMMARY_CLAMP_PX: f32 = 96.0;

fn text_style(color: &str, font_size: &str) -> Style {
    Style {
        color: color.to_string(),
        font_size: font_size.to_string(),
        ..Default::default()
    }
}

fn bold(style: Style) -> Style {
    Style {
        font_weight: FontWeight::Bold,
        ..style
    }
}

fn spaced(gap: f32, margin_bottom: f32) -> Style {
    Style {
        gap,
        margin_bottom,
        ..Default::default()
    }
}

/// Builds the preview tree at `width` CSS pixels. Geometry is not computed;
/// callers reflow the tree they intend to measure.
pub fn render_layout(layout: &ResolvedLayout, width: f32) -> VisualTree {
    let header = render_header(&layout.header);
    let sections: Vec<VisualNode> = layout.sections.iter().map(render_section).collect();

    let body = match &layout.aside {
        Some(slot) => VisualNode::row(
            Style {
                gap: 24.0,
                padding: PAGE_PADDING,
                ..Default::default()
            },
            vec![
                VisualNode::block(
                    Style {
                        width: Some(ASIDE_WIDTH),
                        background: Some(GRAY_100.to_string()),
                        padding: 20.0,
                        text_align: TextAlign::Center,
                        ..Default::default()
                    },
                    vec![image_node(slot)],
                ),
                VisualNode::block(Style::default(), sections),
            ],
        ),
        None => VisualNode::block(
            Style {
                padding: PAGE_PADDING,
                ..Default::default()
            },
            sections,
        ),
    };

    let root = VisualNode::block(
        Style {
            background: Some(WHITE.to_string()),
            ..Default::default()
        },
        vec![header, body],
    );
    VisualTree::new(root, width)
}

fn image_node(slot: &ImageSlot) -> VisualNode {
    let size = slot.size.px();
    VisualNode::image(slot.source.clone(), size, Style::default())
}

fn render_header(header: &HeaderBlock) -> VisualNode {
    let centered = header.arrangement == HeaderArrangement::Stacked;
    let align = if centered { TextAlign::Center } else { TextAlign::Left };

    let mut lines = vec![VisualNode::text(
        header.name.clone(),
        Style {
            text_align: align,
            ..bold(text_style(WHITE, "1.875rem"))
        },
    )];
    if !header.contacts.is_empty() {
        let contacts = header
            .contacts
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join("  |  ");
        lines.push(VisualNode::text(
            contacts,
            Style {
                text_align: align,
                white_space: WhiteSpace::Nowrap,
                overflow: Overflow::Hidden,
                ..text_style(WHITE, "1.2vw")
            },
        ));
    }
    let text_block = VisualNode::block(
        Style {
            gap: 8.0,
            text_align: align,
            ..Default::default()
        },
        lines,
    );

    let row_style = Style {
        gap: 24.0,
        ..Default::default()
    };
    let content = match (header.arrangement, &header.image) {
        (HeaderArrangement::ImageThenText, Some(slot)) => {
            VisualNode::row(row_style, vec![image_node(slot), text_block])
        }
        (HeaderArrangement::TextThenImage, Some(slot)) => {
            VisualNode::row(row_style, vec![text_block, image_node(slot)])
        }
        (HeaderArrangement::Stacked, Some(slot)) => VisualNode::block(
            Style {
                gap: 16.0,
                text_align: TextAlign::Center,
                ..Default::default()
            },
            vec![image_node(slot), text_block],
        ),
        _ => text_block,
    };

    VisualNode::block(
        Style {
            background: Some(header.background.to_css()),
            padding: PAGE_PADDING,
            ..Default::default()
        },
        vec![content],
    )
}

fn render_section(section: &Section) -> VisualNode {
    let heading = VisualNode::text(
        section.heading,
        Style {
            border_left: Some(Border {
                width_px: 4.0,
                color: section.border_color.to_css(),
            }),
            padding: 4.0,
            ..bold(text_style(&section.heading_color.to_css(), "1.25rem"))
        },
    );
    let accent = section.heading_color.to_css();

    let mut children = vec![heading];
    match &section.body {
        SectionBody::Summary(text) => children.push(VisualNode::block(
            Style {
                max_height: Some(SUMMARY_CLAMP_PX),
                overflow: Overflow::Hidden,
                ..Default::default()
            },
            vec![VisualNode::text(text.clone(), text_style(GRAY_700, "0.875rem"))],
        )),
        SectionBody::Experience(items) => children.extend(items.iter().map(render_experience)),
        SectionBody::Projects(items) => {
            children.extend(items.iter().map(|p| render_project(p, &accent)))
        }
        SectionBody::Education(items) => children.extend(items.iter().map(render_education)),
        SectionBody::Skills(groups) => children.extend(groups.iter().map(render_skill_group)),
    }

    VisualNode::block(spaced(12.0, 24.0), children)
}

fn title_row(title: VisualNode, subtitle: Option<VisualNode>, date_range: &str) -> VisualNode {
    let mut left = vec![title];
    left.extend(subtitle);
    VisualNode::row(
        Style {
            gap: 12.0,
            ..Default::default()
        },
        vec![
            VisualNode::block(Style::default(), left),
            VisualNode::text(
                date_range,
                Style {
                    width: Some(DATE_COLUMN_WIDTH),
                    white_space: WhiteSpace::Nowrap,
                    ..text_style(GRAY_600, "0.875rem")
                },
            ),
        ],
    )
}

fn push_paragraph(children: &mut Vec<VisualNode>, text: &str) {
    if !text.trim().is_empty() {
        children.push(VisualNode::text(text, text_style(GRAY_700, "0.875rem")));
    }
}

fn render_experience(item: &ExperienceItem) -> VisualNode {
    let mut children = vec![title_row(
        VisualNode::text(item.position.clone(), bold(text_style(GRAY_900, "1.125rem"))),
        Some(VisualNode::text(item.company.clone(), text_style(GRAY_700, "1rem"))),
        &item.date_range,
    )];
    push_paragraph(&mut children, &item.description);
    for achievement in item.achievements.iter().filter(|a| !a.trim().is_empty()) {
        children.push(VisualNode::text(
            format!("• {achievement}"),
            Style {
                padding: 2.0,
                ..text_style(GRAY_700, "0.875rem")
            },
        ));
    }
    VisualNode::block(spaced(4.0, 12.0), children)
}

fn render_project(item: &ProjectItem, accent: &str) -> VisualNode {
    let link = item
        .link
        .as_ref()
        .map(|_| VisualNode::text(PROJECT_LINK_LABEL, text_style(accent, "0.875rem")));
    let mut children = vec![title_row(
        VisualNode::text(item.name.clone(), bold(text_style(GRAY_900, "1.125rem"))),
        link,
        &item.date_range,
    )];
    push_paragraph(&mut children, &item.description);
    if !item.technologies.is_empty() {
        children.push(VisualNode::text(
            format!("Technologies: {}", item.technologies.join(", ")),
            text_style(GRAY_600, "0.875rem"),
        ));
    }
    VisualNode::block(spaced(4.0, 12.0), children)
}

fn render_education(item: &EducationItem) -> VisualNode {
    let degree = match (item.degree.trim(), item.field.trim()) {
        (d, "") => d.to_string(),
        ("", f) => f.to_string(),
        (d, f) => format!("{d} in {f}"),
    };
    let mut children = vec![
        VisualNode::text(degree, bold(text_style(GRAY_900, "1.125rem"))),
        VisualNode::text(item.institution.clone(), text_style(GRAY_700, "1rem")),
        VisualNode::text(item.graduated.clone(), text_style(GRAY_600, "0.875rem")),
    ];
    if let Some(gpa) = &item.gpa {
        children.push(VisualNode::text(gpa.clone(), text_style(GRAY_600, "0.875rem")));
    }
    VisualNode::block(spaced(2.0, 12.0), children)
}

fn render_skill_group(group: &SkillGroup) -> VisualNode {
    let skills = group
        .skills
        .iter()
        .map(|s| format!("{} ({})", s.name, s.level))
        .collect::<Vec<_>>()
        .join(", ");
    let mut children = Vec::new();
    if !group.category.trim().is_empty() {
        children.push(VisualNode::text(group.category.clone(), bold(text_style(GRAY_900, "1rem"))));
    }
    children.push(VisualNode::text(skills, text_style(GRAY_700, "0.875rem")));
    VisualNode::block(spaced(2.0, 8.0), children)
}
