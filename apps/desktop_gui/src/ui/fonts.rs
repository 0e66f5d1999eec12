//! CJK fallback font so the Chinese locale renders without tofu.

use std::{fs, path::Path, sync::Arc};

use eframe::egui;

const CJK_FONT_NAME: &str = "cjk_fallback";

const CJK_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

pub fn install_cjk_fallback(ctx: &egui::Context) {
    let Some((path, bytes)) = CJK_FONT_CANDIDATES
        .iter()
        .map(Path::new)
        .find_map(|path| fs::read(path).ok().map(|bytes| (path, bytes)))
    else {
        tracing::warn!("no CJK font found; Chinese text may not render");
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    register_fallback(&mut fonts, bytes);
    ctx.set_fonts(fonts);
    tracing::info!(path = %path.display(), "installed CJK fallback font");
}

fn register_fallback(fonts: &mut egui::FontDefinitions, bytes: Vec<u8>) {
    fonts.font_data.insert(
        CJK_FONT_NAME.to_owned(),
        Arc::new(egui::FontData::from_owned(bytes)),
    );
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT_NAME.to_owned());
    }
}
