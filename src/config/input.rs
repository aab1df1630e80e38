//! The `[keys]` and `[editor]` sections.
//!
//! Every normal mode command takes a list of key sequences in vi-like notation:
//! plain characters (`dd`, `gg`) and bracketed keys (`<Esc>`, `<C-l>`, `<A-j>`,
//! `<Tab>`, `<Up>`, `<F1>`, `<Space>`).

use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Keys {
    open: Vec<String>,
    go_parent: Vec<String>,
    cursor_up: Vec<String>,
    cursor_down: Vec<String>,
    go_top: Vec<String>,
    go_bottom: Vec<String>,
    go_home: Vec<String>,
    switch_pane: Vec<String>,
    toggle_select: Vec<String>,
    clear_selection: Vec<String>,
    delete: Vec<String>,
    show_info: Vec<String>,
    reload: Vec<String>,
    cmdline: Vec<String>,
    help: Vec<String>,
    jobs: Vec<String>,
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Editor {
    cmd: String,
}

macro_rules! accessor {
    ($($name:ident),+ $(,)?) => {
        impl Keys {
            $(
                #[inline]
                pub fn $name(&self) -> &[String] {
                    &self.$name
                }
            )+
        }
    };
}

accessor!(
    open,
    go_parent,
    cursor_up,
    cursor_down,
    go_top,
    go_bottom,
    go_home,
    switch_pane,
    toggle_select,
    clear_selection,
    delete,
    show_info,
    reload,
    cmdline,
    help,
    jobs,
    quit,
);

impl Default for Keys {
    fn default() -> Self {
        Keys {
            open: vec!["l".into(), "<Right>".into(), "<Enter>".into()],
            go_parent: vec!["h".into(), "<Left>".into(), "<BS>".into()],
            cursor_up: vec!["k".into(), "<Up>".into()],
            cursor_down: vec!["j".into(), "<Down>".into()],
            go_top: vec!["gg".into(), "<Home>".into()],
            go_bottom: vec!["G".into(), "<End>".into()],
            go_home: vec!["<A-h>".into()],
            switch_pane: vec!["<Tab>".into()],
            toggle_select: vec!["t".into(), "<Space>".into()],
            clear_selection: vec!["<Esc>".into()],
            delete: vec!["dd".into()],
            show_info: vec!["ga".into(), "<C-g>".into()],
            reload: vec!["<C-l>".into()],
            cmdline: vec![":".into()],
            help: vec!["?".into()],
            jobs: vec!["<A-j>".into()],
            quit: vec!["ZZ".into(), "q".into()],
        }
    }
}

impl Editor {
    /// Editor command: the configured one, else `$EDITOR`, else `vi`.
    pub fn cmd(&self) -> String {
        let trimmed = self.cmd.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
        std::env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }

    pub fn exists(&self) -> bool {
        which::which(self.cmd()).is_ok()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Editor { cmd: String::new() }
    }
}
