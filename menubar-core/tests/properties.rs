use menubar_core::config::MenuBarOptions;
use menubar_core::menu::{
    build_hotkey_table, resolve, ActionItem, KeyInput, MenuConfig, MenuNode, MenuStateMachine, OpenPath,
    Submenu, Transition,
};
use menubar_core::shortcut::{Key, KeyEvent, Modifiers};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Debug)]
enum Shape {
    Action { disabled: bool, shortcut: Option<u8> },
    Divider,
    Submenu { disabled: bool, items: Vec<Shape> },
}

fn shape() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        3 => (prop::bool::weighted(0.2), prop::option::of(0u8..8))
            .prop_map(|(disabled, shortcut)| Shape::Action { disabled, shortcut }),
        1 => Just(Shape::Divider),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        (prop::bool::weighted(0.2), prop::collection::vec(inner, 0..5))
            .prop_map(|(disabled, items)| Shape::Submenu { disabled, items })
    })
}

fn menus() -> impl Strategy<Value = Vec<(bool, Vec<Shape>)>> {
    prop::collection::vec((prop::bool::weighted(0.2), prop::collection::vec(shape(), 0..6)), 0..4)
}

fn build_node(shape: &Shape, label: &str, hits: &Arc<AtomicUsize>) -> MenuNode {
    match shape {
        Shape::Action { disabled, shortcut } => {
            let hits = hits.clone();
            let mut action = ActionItem::new(label, move || {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .disabled(*disabled);
            if let Some(key) = shortcut {
                action = action.shortcut(format!("ctrl+{}", (b'a' + key) as char));
            }
            action.into()
        },
        Shape::Divider => MenuNode::Divider,
        Shape::Submenu { disabled, items } => submenu(label, *disabled, items, hits).into(),
    }
}

fn submenu(label: &str, disabled: bool, items: &[Shape], hits: &Arc<AtomicUsize>) -> Submenu {
    Submenu::new(label).disabled(disabled).items(
        items
            .iter()
            .enumerate()
            .map(|(index, item)| build_node(item, &format!("{}/{}", label, index), hits)),
    )
}

fn build(menus: &[(bool, Vec<Shape>)], prefix: &str, hits: &Arc<AtomicUsize>) -> MenuConfig {
    menus
        .iter()
        .enumerate()
        .map(|(index, (disabled, items))| submenu(&format!("{}{}", prefix, index), *disabled, items, hits))
        .collect()
}

#[derive(Clone, Debug)]
enum Op {
    Click(usize),
    Hover(usize),
    Expand(usize),
    Focus(usize),
    HoverItem(Vec<usize>),
    Collapse,
    Activate,
    CloseAll,
    Press(Key),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Click),
        (0usize..4).prop_map(Op::Hover),
        (0usize..6).prop_map(Op::Expand),
        (0usize..6).prop_map(Op::Focus),
        prop::collection::vec(0usize..5, 1..4).prop_map(Op::HoverItem),
        Just(Op::Collapse),
        Just(Op::Activate),
        Just(Op::CloseAll),
        prop_oneof![
            Just(Key::ArrowDown),
            Just(Key::ArrowUp),
            Just(Key::ArrowLeft),
            Just(Key::ArrowRight),
            Just(Key::Enter),
            Just(Key::Escape),
        ]
        .prop_map(Op::Press),
    ]
}

fn run(config: &MenuConfig, machine: &mut MenuStateMachine<()>, op: Op) {
    let transition = match op {
        Op::Click(index) => Transition::ClickTopLevel { index, anchor: None },
        Op::Hover(index) => Transition::HoverTopLevel { index, anchor: None },
        Op::Expand(child) => Transition::Expand { child, anchor: None },
        Op::Focus(child) => Transition::Focus { child },
        Op::HoverItem(path) => Transition::HoverItem { path, anchor: None },
        Op::Collapse => Transition::CollapseOne,
        Op::Activate => Transition::ActivateLeaf,
        Op::CloseAll => Transition::CloseAll,
        Op::Press(key) => {
            let input = KeyInput::menu(KeyEvent::new(key, Modifiers::empty()));
            match resolve(config, machine.state(), input) {
                Some(transition) => transition,
                None => return,
            }
        },
    };
    machine.apply(config, transition);
}

/// Every open level resolves to an openable submenu and the path to a node.
fn assert_valid(config: &MenuConfig, machine: &MenuStateMachine<()>) {
    let Some(cascade) = machine.state().cascade() else {
        return;
    };
    let path = cascade.path();
    assert!(!path.is_empty());
    assert!(OpenPath::new(path.to_vec()).is_valid_in(config));
    assert!(cascade.open_levels() >= 1);
    assert!(path.len() == cascade.open_levels() || path.len() == cascade.open_levels() + 1);
    for level in 1..=cascade.open_levels() {
        let submenu = config.submenu_at(&path[..level]);
        assert!(submenu.is_some_and(|submenu| submenu.is_openable()), "{:?}", path);
    }
    if let Some(focused) = cascade.focused() {
        assert!(config.node_at(focused).is_some_and(|node| !node.is_disabled()));
    }
}

/// Paths to enabled actions reachable through openable submenus.
fn reachable_actions(config: &MenuConfig) -> Vec<Vec<usize>> {
    config
        .walk()
        .filter(|(path, node)| {
            node.as_action().is_some_and(|action| !action.disabled.get())
                && (1..path.len()).all(|len| config.submenu_at(&path[..len]).is_some_and(Submenu::is_openable))
        })
        .map(|(path, _)| path)
        .collect()
}

proptest! {
    #[test]
    fn test_hotkey_table_depends_only_on_shortcuts(menus in menus()) {
        let hits = Arc::default();
        let a = build(&menus, "menu-", &hits);
        let b = build(&menus, "other label ", &hits);
        let table_a = build_hotkey_table(&a);
        let table_b = build_hotkey_table(&b);
        prop_assert_eq!(table_a.is_ok(), table_b.is_ok());
        if let (Ok(table_a), Ok(table_b)) = (table_a, table_b) {
            let combos_a: Vec<_> = table_a.combos().copied().collect();
            let combos_b: Vec<_> = table_b.combos().copied().collect();
            prop_assert_eq!(combos_a, combos_b);
        }
    }

    #[test]
    fn test_random_transitions_keep_paths_valid(menus in menus(), ops in prop::collection::vec(op(), 0..40)) {
        let config = build(&menus, "m", &Arc::default());
        let mut machine = MenuStateMachine::new(MenuBarOptions::default());
        for op in ops {
            run(&config, &mut machine, op);
            assert_valid(&config, &machine);
        }
    }

    #[test]
    fn test_collapse_depth_times_closes(menus in menus(), ops in prop::collection::vec(op(), 0..40)) {
        let config = build(&menus, "m", &Arc::default());
        let mut machine = MenuStateMachine::new(MenuBarOptions::default());
        for op in ops {
            run(&config, &mut machine, op);
        }
        let depth = machine.state().depth();
        for _ in 0..depth {
            prop_assert!(machine.state().is_open());
            machine.collapse_one(&config);
        }
        prop_assert!(!machine.state().is_open());
    }

    #[test]
    fn test_activate_leaf_always_closes(menus in menus(), pick in any::<prop::sample::Index>()) {
        let hits = Arc::new(AtomicUsize::new(0));
        let config = build(&menus, "m", &hits);
        let targets = reachable_actions(&config);
        prop_assume!(!targets.is_empty());
        let target = pick.get(&targets);

        let mut machine: MenuStateMachine<()> = MenuStateMachine::new(MenuBarOptions::default());
        machine.click_top_level(&config, target[0], None);
        for depth in 2..target.len() {
            machine.expand(&config, target[depth - 1], None);
        }
        machine.apply(&config, Transition::Focus { child: target[target.len() - 1] });
        prop_assert_eq!(machine.state().path(), &target[..]);

        machine.activate_leaf(&config);
        prop_assert!(!machine.state().is_open());
        prop_assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_arrow_navigation_is_cyclic(items in prop::collection::vec(shape(), 1..8)) {
        let config = MenuConfig::from(submenu("Menu", false, &items, &Arc::default()));
        let navigable = config.menus()[0].items.iter().filter(|node| node.is_navigable()).count();
        prop_assume!(navigable > 0);

        let mut machine = MenuStateMachine::new(MenuBarOptions::default());
        machine.click_top_level(&config, 0, None);
        run(&config, &mut machine, Op::Press(Key::ArrowDown));
        let start = machine.state().path().to_vec();
        for _ in 0..navigable {
            run(&config, &mut machine, Op::Press(Key::ArrowDown));
        }
        prop_assert_eq!(machine.state().path(), &start[..]);
        for _ in 0..navigable {
            run(&config, &mut machine, Op::Press(Key::ArrowUp));
        }
        prop_assert_eq!(machine.state().path(), &start[..]);
    }
}
