use egui::Context;

use crate::model::arena::MAX_HEALTH;
use crate::model::{MatchEvent, PlayerId};

/// How long the winner banner stays up after a round ends.
const BANNER_SECONDS: f32 = 2.5;

/// Presentation-side HUD state, fed by the match events the game loop
/// surfaces each frame.
pub struct Hud {
    pub health: [i32; 2],
    pub winner: Option<PlayerId>,
    banner_age: f32,
    pub fps: f32,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            health: [MAX_HEALTH, MAX_HEALTH],
            winner: None,
            banner_age: 0.0,
            fps: 0.0,
        }
    }

    pub fn apply_event(&mut self, event: &MatchEvent) {
        match event {
            MatchEvent::HealthChanged { player, health } => {
                self.health[player.index()] = *health;
            }
            MatchEvent::RoundOver { winner } => {
                self.winner = Some(*winner);
                self.banner_age = 0.0;
            }
        }
    }

    /// Age the winner banner and drop it once its time is up.
    pub fn tick(&mut self, dt: f32) {
        if self.winner.is_some() {
            self.banner_age += dt;
            if self.banner_age >= BANNER_SECONDS {
                self.winner = None;
            }
        }
    }
}

/// Build the complete HUD for one frame.
pub fn build_hud(ctx: &Context, hud: &Hud) {
    draw_health_panel(ctx, PlayerId::One, hud.health[0], egui::Align2::LEFT_TOP);
    draw_health_panel(ctx, PlayerId::Two, hud.health[1], egui::Align2::RIGHT_TOP);
    if let Some(winner) = hud.winner {
        draw_winner_banner(ctx, winner);
    }
    draw_status_line(ctx, hud.fps);
}

fn draw_health_panel(ctx: &Context, player: PlayerId, health: i32, anchor: egui::Align2) {
    let color = match player {
        PlayerId::One => egui::Color32::from_rgb(230, 60, 60),
        PlayerId::Two => egui::Color32::from_rgb(70, 90, 230),
    };
    egui::Area::new(egui::Id::new(("health", player.index())))
        .anchor(anchor, [if anchor == egui::Align2::LEFT_TOP { 8.0 } else { -8.0 }, 8.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(160))
                .inner_margin(6.0)
                .show(ui, |ui| {
                    ui.label(egui::RichText::new(player.label()).color(color).strong());
                    ui.label(
                        egui::RichText::new(format!("{health}"))
                            .size(22.0)
                            .color(egui::Color32::WHITE),
                    );
                });
        });
}

fn draw_winner_banner(ctx: &Context, winner: PlayerId) {
    egui::Area::new(egui::Id::new("winner_banner"))
        .anchor(egui::Align2::CENTER_CENTER, [0.0, -40.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(200))
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{} wins!", winner.label()))
                            .size(32.0)
                            .color(egui::Color32::YELLOW),
                    );
                });
        });
}

fn draw_status_line(ctx: &Context, fps: f32) {
    egui::Area::new(egui::Id::new("status_line"))
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -8.0])
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!(
                    "P1: WASD + Space   P2: Arrows + Enter   {fps:.0} FPS"
                ))
                .small()
                .color(egui::Color32::from_white_alpha(180)),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_update_health_readouts() {
        let mut hud = Hud::new();
        hud.apply_event(&MatchEvent::HealthChanged {
            player: PlayerId::Two,
            health: 70,
        });
        assert_eq!(hud.health, [MAX_HEALTH, 70]);
    }

    #[test]
    fn winner_banner_expires() {
        let mut hud = Hud::new();
        hud.apply_event(&MatchEvent::RoundOver {
            winner: PlayerId::One,
        });
        assert_eq!(hud.winner, Some(PlayerId::One));

        hud.tick(1.0);
        assert_eq!(hud.winner, Some(PlayerId::One));
        hud.tick(2.0);
        assert_eq!(hud.winner, None);
    }
}
