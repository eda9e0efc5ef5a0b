// Multi-language support module
// Provides localized UI strings for English and Chinese

#[derive(Clone)]
pub struct Assets {
    // Menu items
    pub menu_help: &'static str,
    pub menu_new: &'static str,
    pub menu_size: &'static str,
    pub menu_options: &'static str,
    pub menu_about: &'static str,
    pub menu_exit: &'static str,

    // Options modal
    pub opt_show_indicator: &'static str,
    pub opt_ascii_icons: &'static str,
    pub opt_language: &'static str,

    // Help modal
    pub help_controls: &'static str,
    pub help_move: &'static str,
    pub help_reveal: &'static str,
    pub help_flag: &'static str,

    // Loss modal
    pub loss_title: &'static str,
    pub loss_message: &'static str,
    pub loss_better_luck: &'static str,

    // Status bar
    pub status_mines: &'static str,

    // Buttons
    pub btn_ok: &'static str,
    pub btn_close: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2_fmt: &'static str, // "Minimum size required: {} x {}"
    pub tsmsg_title: &'static str,

    // Language names for selection
    pub lang_english: &'static str,
    pub lang_chinese: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        menu_help: "Help",
        menu_new: "New",
        menu_size: "Size",
        menu_options: "Options",
        menu_about: "About",
        menu_exit: "Exit",

        opt_show_indicator: "Show indicator",
        opt_ascii_icons: "ASCII icons",
        opt_language: "Language",

        help_controls: " Controls:",
        help_move: "  Mouse | Arrows  - move cursor",
        help_reveal: "  L-Click | Space - reveal",
        help_flag: "  R-Click | F     - toggle flag",

        loss_title: "Failure",
        loss_message: "Mine Exploded! Game over.",
        loss_better_luck: "Better luck next time.",

        status_mines: "Mines",

        btn_ok: " OK ",
        btn_close: " CLOSE ",

        tsmsg_line1: "Terminal layout too small",
        tsmsg_line2_fmt: "Minimum size required: {} x {}",
        tsmsg_title: "Resize needed",

        lang_english: "English",
        lang_chinese: "中文",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        menu_help: "帮助",
        menu_new: "新游戏",
        menu_size: "尺寸",
        menu_options: "选项",
        menu_about: "关于",
        menu_exit: "退出",

        opt_show_indicator: "显示游标",
        opt_ascii_icons: "ASCII图标",
        opt_language: "语言",

        help_controls: " 操作说明：",
        help_move: "  鼠标 | 方向键 - 移动光标",
        help_reveal: "  左键 | 空格   - 翻开",
        help_flag: "  右键 | F      - 标记/取消",

        loss_title: "失败",
        loss_message: "地雷爆炸！游戏结束。",
        loss_better_luck: "祝下次好运。",

        status_mines: "地雷",

        btn_ok: " 确定 ",
        btn_close: " 关闭 ",

        tsmsg_line1: "终端屏幕布局过小",
        tsmsg_line2_fmt: "最小需要尺寸：{} x {}",
        tsmsg_title: "需要调整大小",

        lang_english: "English",
        lang_chinese: "中文",
    }
}

/// Main language manager struct
/// Holds the current language code and active string assets
pub struct Lang {
    pub current_lang: String,
    pub assets: Assets,
}

impl Lang {
    /// Creates a new Lang instance from a language code
    /// Normalizes input (e.g. "zh-CN" -> "zh") and defaults to English
    pub fn new(lang_code: &str) -> Self {
        let code = Self::normalize(lang_code);
        Lang {
            current_lang: code.to_string(),
            assets: if code == "zh" {
                chinese_assets()
            } else {
                english_assets()
            },
        }
    }

    /// Switches the current language and reloads all string assets
    pub fn switch_to(&mut self, lang_code: &str) {
        let code = Self::normalize(lang_code);
        self.current_lang = code.to_string();
        self.assets = if code == "zh" {
            chinese_assets()
        } else {
            english_assets()
        };
    }

    fn normalize(lang_code: &str) -> &'static str {
        if lang_code.to_lowercase().starts_with("zh") {
            "zh"
        } else {
            "en"
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalizes_region_codes() {
        let lang = Lang::new("zh-CN");
        assert_eq!(lang.current_lang, "zh");
        let lang = Lang::new("fr-FR");
        assert_eq!(lang.current_lang, "en");
    }

    #[test]
    fn switch_replaces_assets() {
        let mut lang = Lang::new("en");
        assert_eq!(lang.assets.menu_exit, "Exit");
        lang.switch_to("zh");
        assert_eq!(lang.assets.menu_exit, "退出");
    }
}
