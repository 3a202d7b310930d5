use menubar::prelude::*;

/// Prints every renderer call instead of drawing.
struct ConsoleRenderer;

impl MenuRenderer<&'static str> for ConsoleRenderer {
    fn open(&mut self, path: &[usize], anchor: Option<&&'static str>, submenu: &Submenu, closer: &MenuCloser) {
        println!("  open  {:?} '{}' at {:?}", path, submenu.label, anchor);
        for item in &submenu.items {
            if let MenuNode::Component(component) = item {
                component.component.attach(closer.clone());
            }
        }
    }

    fn close(&mut self, path: &[usize]) {
        println!("  close {:?}", path);
    }

    fn close_all(&mut self) {
        println!("  close all");
    }

    fn highlight(&mut self, path: Option<&[usize]>) {
        println!("  focus {:?}", path);
    }

    fn configure(&mut self, hints: &RenderHints) {
        println!("  hints {:?}", hints);
    }
}

fn key(key: Key) -> InputEvent<&'static str> {
    InputEvent::Key(KeyInput::menu(KeyEvent::new(key, Modifiers::empty())))
}

fn click(index: usize, anchor: &'static str) -> InputEvent<&'static str> {
    InputEvent::PointerDown(PointerTarget::TopLevel { index, anchor })
}

fn main() {
    env_logger::init();

    println!("Menu Bar Demo");
    println!("=============");
    println!("Set RUST_LOG=trace to see every transition.");
    println!();

    let settings = SettingsRegistry::new().unwrap_or_else(|e| {
        log::warn!("Falling back to default settings: {}", e);
        SettingsRegistry::default()
    });

    let registry = ShortcutRegistry::new();
    let mut bar = MenuBar::new(default_menu_config(), settings.options())
        .with_hints(settings.hints())
        .with_renderer(ConsoleRenderer);
    bar.mount(registry.clone());
    for error in bar.hotkey_errors() {
        log::error!("{}", error);
    }

    let script: Vec<(&str, Vec<InputEvent<&'static str>>)> = vec![
        ("click File", vec![click(0, "file-trigger")]),
        ("arrow down twice", vec![key(Key::ArrowDown), key(Key::ArrowDown)]),
        ("arrow right to Table", vec![key(Key::ArrowRight)]),
        ("hover back to File", vec![InputEvent::PointerEnter(PointerTarget::TopLevel {
            index: 0,
            anchor: "file-trigger",
        })]),
        ("click elsewhere", vec![InputEvent::PointerDown(PointerTarget::Outside)]),
        ("open File from the keyboard", vec![InputEvent::Key(KeyInput::top_level(
            KeyEvent::new(Key::Enter, Modifiers::empty()),
            0,
            Some("file-trigger"),
        ))]),
        ("escape", vec![key(Key::Escape)]),
    ];

    for (step, events) in script {
        println!("{}:", step);
        let update = bar.dispatch(events);
        println!("  -> {:?}, path {:?}", update, bar.state().path());
    }

    println!("press ctrl+s through the global registry:");
    let disposition = registry.try_dispatch(&KeyEvent::new(Key::Char('s'), Modifiers::CONTROL));
    println!("  -> {:?}", disposition);

    bar.unmount();
    println!("unmounted, {} hotkeys left registered", registry.len());
}
