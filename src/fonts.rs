// fonts.rs: pick a UI font that covers the translated scripts
//
// Searches system font directories, then ./assets/fonts next to the executable
// or in the working directory. ab_glyph validates each candidate; .ttc files
// it cannot parse are skipped.

use std::path::PathBuf;

const ASSET_FONTS: [&str; 4] = [
    "NotoSansSC-Regular.otf",
    "NotoSansSC-Regular.ttf",
    "NotoSansCJK-Regular.ttc",
    "NotoSans-Regular.ttf",
];

fn system_candidates() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(windows) {
        &[
            r"C:\Windows\Fonts\msyh.ttf",
            r"C:\Windows\Fonts\simhei.ttf",
            r"C:\Windows\Fonts\segoeui.ttf",
            r"C:\Windows\Fonts\arial.ttf",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/Hiragino Sans GB.ttc",
            "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

fn candidates() -> Vec<PathBuf> {
    let mut out = system_candidates();
    let mut roots = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            roots.push(dir.join("assets").join("fonts"));
        }
    }
    roots.push(PathBuf::from("assets").join("fonts"));
    for root in roots {
        out.extend(ASSET_FONTS.iter().map(|f| root.join(f)));
    }
    out
}

fn load_valid_font(path: &PathBuf) -> Option<Vec<u8>> {
    let bytes = std::fs::read(path).ok()?;
    ab_glyph::FontRef::try_from_slice(&bytes).ok()?;
    Some(bytes)
}

pub fn install_ui_font(ctx: &egui::Context) {
    let Some((path, bytes)) = candidates()
        .into_iter()
        .find_map(|p| load_valid_font(&p).map(|b| (p, b)))
    else {
        log::warn!("{}", crate::i18n::tr("font.not_found"));
        return;
    };

    log::info!(
        "{}",
        crate::i18n::tr_with("font.using", &[("path", path.display().to_string())])
    );

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert("ui".to_owned(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        if let Some(list) = fonts.families.get_mut(&family) {
            // After the default face so its emoji/icons still win for glyphs it has.
            list.insert(1.min(list.len()), "ui".to_owned());
        }
    }
    ctx.set_fonts(fonts);
}
