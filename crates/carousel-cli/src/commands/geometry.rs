use std::time::Instant;

use anyhow::{bail, Result};
use ratatui::layout::Rect;
use serde::Serialize;

use carousel_core::config::AnimationConfig;
use carousel_core::{AppConfig, Carousel, Size, Vec2};
use carousel_tui::{viewport::Viewport, TerminalHost};

use super::load_items;

pub struct Options {
    pub width: u16,
    pub height: u16,
    pub select: Option<usize>,
    pub json: bool,
}

/// One window position of the loaded carousel
#[derive(Debug, Serialize)]
struct Row {
    position: usize,
    slot: usize,
    item: usize,
    label: String,
    offset: Vec2,
    rotation: f64,
    scale: f64,
    tilt: f64,
    z: i32,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    layout: String,
    density: usize,
    items: usize,
    selected_index: usize,
    pitch: f64,
    item_size: Size,
    hit_area: Size,
    wheel_angle: f64,
    slots: Vec<Row>,
}

pub async fn run(config: AppConfig, options: Options) -> Result<()> {
    let items = load_items(config.general.items_file.as_deref())?;
    let report = build_report(config, items, &options).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(())
}

async fn build_report(config: AppConfig, items: Vec<String>, options: &Options) -> Result<Report> {
    // Placement is read back from the host, so transitions land immediately
    let animation = AnimationConfig {
        smooth_enabled: false,
        ..config.ui.animation.clone()
    };
    let host = TerminalHost::new(animation, config.ui.colors.deselected);
    let area = Rect::new(0, 0, options.width, options.height);
    let mut carousel = Carousel::new(config.carousel.clone(), host, Viewport::container(area));

    let Some(pending) = carousel.set_items(items, Instant::now()) else {
        bail!("No items to lay out");
    };
    let outcome = pending.wait().await;
    if !outcome.is_success() {
        bail!("Carousel failed to load: {:?}", outcome);
    }
    if let Some(index) = options.select {
        carousel.set_selected_index(index, Instant::now());
    }

    let Some(window) = carousel.window() else {
        bail!("Carousel has no window");
    };
    let layout = carousel.layout();
    let selected_slot = carousel.selected_slot();
    let host = carousel.host();

    let slots = (0..window.density())
        .filter_map(|position| {
            let slot = window.slot_at(position);
            let entry = window.slot(slot)?;
            let view = host.slots().get(slot)?;
            let visual = view.visual.as_ref()?.target();
            Some(Row {
                position,
                slot,
                item: entry.item,
                label: view.label.clone(),
                offset: visual.offset,
                rotation: visual.rotation,
                scale: visual.scale,
                tilt: visual.tilt,
                z: view.z,
                selected: selected_slot == Some(slot),
            })
        })
        .collect();

    Ok(Report {
        layout: format!("{:?}", layout.mode).to_lowercase(),
        density: layout.density,
        items: carousel.items().len(),
        selected_index: carousel.selected_index(),
        pitch: layout.pitch(),
        item_size: layout.item,
        hit_area: carousel.hit_area(),
        wheel_angle: carousel.wheel_angle(),
        slots,
    })
}

fn print_table(report: &Report) {
    println!(
        "{} layout, {} slots over {} items, selected {} (pitch {:.2}, hit area {:.1}x{:.1})\n",
        report.layout,
        report.density,
        report.items,
        report.selected_index,
        report.pitch,
        report.hit_area.width,
        report.hit_area.height,
    );
    println!(
        "  {:>3} {:>4} {:>5}  {:<20} {:>9} {:>9} {:>7} {:>6} {:>7} {:>6}",
        "pos", "slot", "item", "label", "x", "y", "rot", "scale", "tilt", "z"
    );
    for row in &report.slots {
        let marker = if row.selected { '>' } else { ' ' };
        println!(
            "{} {:>3} {:>4} {:>5}  {:<20} {:>9.2} {:>9.2} {:>7.1} {:>6.2} {:>7.1} {:>6}",
            marker,
            row.position,
            row.slot,
            row.item,
            truncate(&row.label, 20),
            row.offset.x,
            row.offset.y,
            row.rotation,
            row.scale,
            row.tilt,
            row.z,
        );
    }
}

fn truncate(label: &str, max: usize) -> String {
    if label.chars().count() <= max {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(max - 1).collect();
        short.push('~');
        short
    }
}
