//! Heads-up display: resource bars, gravity readout, damage flash and the
//! death banner, drawn with egui from simulation messages.

use bevy::prelude::*;
use bevy_egui::{EguiContext, EguiPrimaryContextPass, egui};

use crate::simulation::{HudChanged, HudSnapshot, PlayerDamaged, PlayerDied, SimulationState};

/// HUD layout and timing.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct HudConfig {
    /// Seconds the red damage overlay stays up.
    pub flash_duration: f32,
    /// Peak opacity of the damage overlay.
    pub flash_opacity: f32,
    /// Damage at or above which the overlay reaches full opacity.
    pub flash_full_damage: f32,
    /// Overlay strength floor for small hits.
    pub flash_min_strength: f32,
    /// Width of each resource bar in points.
    pub bar_width: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            flash_duration: 0.2,
            flash_opacity: 0.3,
            flash_full_damage: 25.0,
            flash_min_strength: 0.4,
            bar_width: 200.0,
        }
    }
}

/// Countdown for the damage overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct DamageFlash {
    remaining: f32,
    duration: f32,
    strength: f32,
}

impl DamageFlash {
    /// Restarts the overlay for `duration` seconds at `strength` in `[0, 1]`.
    ///
    /// A retrigger keeps the stronger of the running and the new hit.
    pub fn trigger(&mut self, duration: f32, strength: f32) {
        let strength = strength.clamp(0.0, 1.0);
        self.strength = if self.active() {
            self.strength.max(strength)
        } else {
            strength
        };
        self.remaining = duration;
        self.duration = duration;
    }

    /// Counts down by `dt`.
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    /// Whether the overlay is showing.
    pub fn active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Overlay opacity, fading linearly to zero.
    pub fn opacity(&self, peak: f32) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        peak * self.strength * self.remaining / self.duration
    }
}

/// Overlay strength for a hit of `amount`, scaled against `full_damage`.
pub fn flash_strength(amount: f32, full_damage: f32, min_strength: f32) -> f32 {
    if full_damage <= 0.0 {
        return 1.0;
    }
    (amount / full_damage).clamp(min_strength, 1.0)
}

/// What the HUD currently shows.
#[derive(Resource, Clone, Debug, Default, Reflect)]
pub struct HudState {
    /// Latest resource values.
    pub snapshot: Option<HudSnapshot>,
    /// Damage overlay.
    pub flash: DamageFlash,
    /// Death banner visible.
    pub dead: bool,
}

/// `"9.8 m/s²"`.
pub fn gravity_label(gravity: f32) -> String {
    format!("{gravity:.1} m/s²")
}

/// Whole-percent label for a `[0, 1]` fraction.
pub fn percent_label(fraction: f32) -> String {
    format!("{:.0}%", (fraction * 100.0).clamp(0.0, 100.0))
}

/// Egui HUD fed by [`HudChanged`], [`PlayerDamaged`] and [`PlayerDied`].
pub struct HudPlugin(pub HudConfig);

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<HudConfig>()
            .register_type::<HudState>()
            .insert_resource(self.0.clone())
            .init_resource::<HudState>()
            .add_systems(Update, collect_hud_messages)
            .add_systems(EguiPrimaryContextPass, draw_hud);
    }
}

// ── Update: message intake ──────────────────────────────────────────

fn collect_hud_messages(
    time: Res<Time>,
    cfg: Res<HudConfig>,
    sim: Option<Res<SimulationState>>,
    mut hud: ResMut<HudState>,
    mut changed: MessageReader<HudChanged>,
    mut damaged: MessageReader<PlayerDamaged>,
    mut died: MessageReader<PlayerDied>,
) {
    if hud.snapshot.is_none() {
        hud.snapshot = sim.map(|sim| sim.hud());
    }
    if let Some(HudChanged(snapshot)) = changed.read().last() {
        hud.snapshot = Some(*snapshot);
    }

    hud.flash.tick(time.delta_secs());
    let heaviest = damaged.read().map(|d| d.amount).reduce(f32::max);
    if let Some(amount) = heaviest {
        let strength = flash_strength(amount, cfg.flash_full_damage, cfg.flash_min_strength);
        hud.flash.trigger(cfg.flash_duration, strength);
    }
    if died.read().count() > 0 {
        hud.dead = true;
    }
}

// ── EguiPrimaryContextPass: drawing ─────────────────────────────────

fn draw_hud(
    mut egui_ctx: Query<&mut EguiContext>,
    cfg: Res<HudConfig>,
    hud: Res<HudState>,
) {
    let Some(snapshot) = hud.snapshot else { return };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let ctx = ctx.get_mut();

    egui::Area::new(egui::Id::new("hud_bars"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(16.0, 16.0))
        .show(ctx, |ui| {
            resource_bar(
                ui,
                "Health",
                snapshot.health_fraction,
                egui::Color32::from_rgb(0xef, 0x44, 0x44),
                cfg.bar_width,
            );
            resource_bar(
                ui,
                "Ammo",
                snapshot.ammo_fraction,
                egui::Color32::from_rgb(0xf5, 0x9e, 0x0b),
                cfg.bar_width,
            );
            resource_bar(
                ui,
                "Jetpack",
                snapshot.energy_fraction,
                egui::Color32::from_rgb(0x38, 0xbd, 0xf8),
                cfg.bar_width,
            );
            ui.label(
                egui::RichText::new(format!("Gravity {}", gravity_label(snapshot.gravity)))
                    .color(egui::Color32::WHITE),
            );
        });

    let screen = ctx.content_rect();
    if hud.flash.active() {
        let alpha = (hud.flash.opacity(cfg.flash_opacity) * 255.0) as u8;
        ctx.layer_painter(egui::LayerId::background()).rect_filled(
            screen,
            0.0,
            egui::Color32::from_rgba_unmultiplied(255, 0, 0, alpha),
        );
    }

    if hud.dead || snapshot.health_fraction <= 0.0 {
        ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("death_banner"),
        ))
        .text(
            screen.center(),
            egui::Align2::CENTER_CENTER,
            "YOU DIED",
            egui::FontId::proportional(48.0),
            egui::Color32::from_rgb(0xef, 0x44, 0x44),
        );
    }
}

fn resource_bar(ui: &mut egui::Ui, name: &str, fraction: f32, color: egui::Color32, width: f32) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(name).color(egui::Color32::WHITE));
        ui.add(
            egui::ProgressBar::new(fraction.clamp(0.0, 1.0))
                .desired_width(width)
                .fill(color)
                .text(percent_label(fraction)),
        );
    });
}
