// SPDX-License-Identifier: MIT OR Apache-2.0
//! Menu configuration tree
//!
//! A [MenuConfig] is the ordered list of top-level [Submenu]s of a menu bar.
//! Every other node lives inside one of those submenus.

use crate::menu::component::MenuComponent;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Callback executed when an action item is activated.
pub type MenuAction = Arc<dyn Fn() + Send + Sync>;

/// Whether a node rejects interaction.
///
/// A static flag is fixed for the lifetime of the config. A dynamic flag is
/// shared with the embedding application, which may toggle it at any time;
/// every clone observes the change.
#[derive(Clone)]
pub enum DisabledFlag {
    /// Fixed at config build time.
    Static(bool),
    /// Toggled at runtime.
    Dynamic(Arc<AtomicBool>),
}

impl DisabledFlag {
    /// A new runtime-togglable flag.
    pub fn dynamic(disabled: bool) -> Self {
        DisabledFlag::Dynamic(Arc::new(AtomicBool::new(disabled)))
    }

    /// Current value.
    pub fn get(&self) -> bool {
        match self {
            DisabledFlag::Static(disabled) => *disabled,
            DisabledFlag::Dynamic(flag) => flag.load(Ordering::Acquire),
        }
    }

    /// Update a dynamic flag. Static flags are left untouched and `false` is returned.
    pub fn set(&self, disabled: bool) -> bool {
        match self {
            DisabledFlag::Static(_) => false,
            DisabledFlag::Dynamic(flag) => {
                flag.store(disabled, Ordering::Release);
                true
            },
        }
    }

    /// Returns `true` for flags that can never change.
    pub fn is_static(&self) -> bool {
        matches!(self, DisabledFlag::Static(_))
    }
}

impl Default for DisabledFlag {
    fn default() -> Self {
        DisabledFlag::Static(false)
    }
}

impl From<bool> for DisabledFlag {
    fn from(disabled: bool) -> Self {
        DisabledFlag::Static(disabled)
    }
}

impl fmt::Debug for DisabledFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisabledFlag::Static(disabled) => write!(f, "Static({})", disabled),
            DisabledFlag::Dynamic(flag) => {
                write!(f, "Dynamic({})", flag.load(Ordering::Acquire))
            },
        }
    }
}

/// A branch of the menu tree.
#[derive(Clone, Debug, Default)]
pub struct Submenu {
    /// Display label.
    pub label: String,
    /// Disabled submenus cannot be opened.
    pub disabled: DisabledFlag,
    /// Children in render and navigation order.
    pub items: Vec<MenuNode>,
}

impl Submenu {
    /// Create an empty submenu.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            disabled: DisabledFlag::default(),
            items: Vec::new(),
        }
    }

    /// Append a child.
    pub fn item(mut self, item: impl Into<MenuNode>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Append several children.
    pub fn items(mut self, items: impl IntoIterator<Item = MenuNode>) -> Self {
        self.items.extend(items);
        self
    }

    /// Append a divider.
    pub fn divider(mut self) -> Self {
        self.items.push(MenuNode::Divider);
        self
    }

    /// Set the disabled flag.
    pub fn disabled(mut self, disabled: impl Into<DisabledFlag>) -> Self {
        self.disabled = disabled.into();
        self
    }

    /// Whether the submenu can be opened right now.
    ///
    /// An empty submenu still renders its trigger but never opens.
    pub fn is_openable(&self) -> bool {
        !self.disabled.get() && !self.items.is_empty()
    }
}

/// A leaf that runs a callback and closes the whole cascade.
#[derive(Clone)]
pub struct ActionItem {
    /// Display label.
    pub label: String,
    /// Disabled actions never run.
    pub disabled: DisabledFlag,
    /// Callback.
    pub action: MenuAction,
    /// Opaque icon name, interpreted by the renderer.
    pub icon: Option<String>,
    /// Shortcut as written by the author, e.g. `"Ctrl+S"`.
    pub shortcut: Option<String>,
}

impl ActionItem {
    /// Create an enabled action without shortcut or icon.
    pub fn new<F>(label: impl Into<String>, action: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            disabled: DisabledFlag::default(),
            action: Arc::new(action),
            icon: None,
            shortcut: None,
        }
    }

    /// Set the shortcut.
    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    /// Set the icon name.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the disabled flag.
    pub fn disabled(mut self, disabled: impl Into<DisabledFlag>) -> Self {
        self.disabled = disabled.into();
        self
    }

    /// Run the callback unless the item is disabled at this moment.
    ///
    /// Returns `true` if the callback ran.
    pub fn invoke(&self) -> bool {
        if self.disabled.get() {
            log::trace!("Action '{}' is disabled, not invoking", self.label);
            return false;
        }
        log::debug!("Invoking action '{}'", self.label);
        (self.action)();
        true
    }
}

impl fmt::Debug for ActionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionItem")
            .field("label", &self.label)
            .field("disabled", &self.disabled)
            .field("icon", &self.icon)
            .field("shortcut", &self.shortcut)
            .finish_non_exhaustive()
    }
}

/// A leaf that hosts an externally supplied widget.
#[derive(Clone)]
pub struct ComponentItem {
    /// The embedded widget.
    pub component: Arc<dyn MenuComponent>,
}

impl ComponentItem {
    /// Wrap a component.
    pub fn new(component: impl MenuComponent + 'static) -> Self {
        Self {
            component: Arc::new(component),
        }
    }
}

impl fmt::Debug for ComponentItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentItem").field(&self.component.name()).finish()
    }
}

/// A node in the menu tree.
#[derive(Clone, Debug)]
pub enum MenuNode {
    /// A branch with children.
    Submenu(Submenu),
    /// A leaf that runs a callback.
    Action(ActionItem),
    /// A separator. Never focusable, never hotkeyable.
    Divider,
    /// A leaf delegating interaction to an embedded widget.
    Component(ComponentItem),
}

impl MenuNode {
    /// The display label, if the node has one.
    pub fn label(&self) -> Option<&str> {
        match self {
            MenuNode::Submenu(submenu) => Some(&submenu.label),
            MenuNode::Action(action) => Some(&action.label),
            MenuNode::Divider | MenuNode::Component(_) => None,
        }
    }

    /// Current disabled state. Dividers count as disabled, components never do.
    pub fn is_disabled(&self) -> bool {
        match self {
            MenuNode::Submenu(submenu) => submenu.disabled.get(),
            MenuNode::Action(action) => action.disabled.get(),
            MenuNode::Divider => true,
            MenuNode::Component(_) => false,
        }
    }

    /// Whether keyboard focus may land on this node.
    pub fn is_navigable(&self) -> bool {
        !self.is_disabled()
    }

    /// The submenu, if this node is one.
    pub fn as_submenu(&self) -> Option<&Submenu> {
        match self {
            MenuNode::Submenu(submenu) => Some(submenu),
            _ => None,
        }
    }

    /// The action, if this node is one.
    pub fn as_action(&self) -> Option<&ActionItem> {
        match self {
            MenuNode::Action(action) => Some(action),
            _ => None,
        }
    }
}

impl From<Submenu> for MenuNode {
    fn from(submenu: Submenu) -> Self {
        MenuNode::Submenu(submenu)
    }
}

impl From<ActionItem> for MenuNode {
    fn from(action: ActionItem) -> Self {
        MenuNode::Action(action)
    }
}

impl From<ComponentItem> for MenuNode {
    fn from(component: ComponentItem) -> Self {
        MenuNode::Component(component)
    }
}

/// The top-level menus of a menu bar.
///
/// The bar itself is the implicit root. An empty config is valid and renders
/// nothing.
#[derive(Clone, Debug, Default)]
pub struct MenuConfig {
    menus: Vec<Submenu>,
}

impl MenuConfig {
    /// Create a config from top-level submenus.
    pub fn new(menus: Vec<Submenu>) -> Self {
        Self { menus }
    }

    /// Top-level submenus in bar order.
    pub fn menus(&self) -> &[Submenu] {
        &self.menus
    }

    /// Top-level submenu at `index`.
    pub fn top_level(&self, index: usize) -> Option<&Submenu> {
        self.menus.get(index)
    }

    /// Number of top-level menus.
    pub fn len(&self) -> usize {
        self.menus.len()
    }

    /// Returns `true` if there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    /// Resolve an index path to a node.
    ///
    /// `path[0]` selects the top-level menu; each further index selects a
    /// child of the previous node, which must be a submenu.
    pub fn node_at(&self, path: &[usize]) -> Option<NodeRef<'_>> {
        let (first, rest) = path.split_first()?;
        let mut current = NodeRef::TopLevel(self.menus.get(*first)?);
        for index in rest {
            let submenu = current.as_submenu()?;
            current = NodeRef::Child(submenu.items.get(*index)?);
        }
        Some(current)
    }

    /// Resolve an index path to a submenu.
    pub fn submenu_at(&self, path: &[usize]) -> Option<&Submenu> {
        self.node_at(path)?.as_submenu()
    }

    /// Pre-order traversal of every node below the top-level menus,
    /// including the top-level menus themselves.
    pub fn walk(&self) -> Walk<'_> {
        let stack = self
            .menus
            .iter()
            .enumerate()
            .rev()
            .map(|(index, submenu)| (vec![index], NodeRef::TopLevel(submenu)))
            .collect();
        Walk { stack }
    }
}

impl From<Submenu> for MenuConfig {
    fn from(submenu: Submenu) -> Self {
        Self::new(vec![submenu])
    }
}

impl From<Vec<Submenu>> for MenuConfig {
    fn from(menus: Vec<Submenu>) -> Self {
        Self::new(menus)
    }
}

impl FromIterator<Submenu> for MenuConfig {
    fn from_iter<T: IntoIterator<Item = Submenu>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A borrowed node of a [MenuConfig].
///
/// Top-level menus are stored as plain [Submenu]s, everything below as
/// [MenuNode]s; this unifies the two.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    /// A top-level menu.
    TopLevel(&'a Submenu),
    /// Any nested node.
    Child(&'a MenuNode),
}

impl<'a> NodeRef<'a> {
    /// The submenu, if this node is one.
    pub fn as_submenu(&self) -> Option<&'a Submenu> {
        match self {
            NodeRef::TopLevel(submenu) => Some(submenu),
            NodeRef::Child(node) => node.as_submenu(),
        }
    }

    /// The action, if this node is one.
    pub fn as_action(&self) -> Option<&'a ActionItem> {
        match self {
            NodeRef::TopLevel(_) => None,
            NodeRef::Child(node) => node.as_action(),
        }
    }

    /// Current disabled state.
    pub fn is_disabled(&self) -> bool {
        match self {
            NodeRef::TopLevel(submenu) => submenu.disabled.get(),
            NodeRef::Child(node) => node.is_disabled(),
        }
    }
}

/// Iterator returned by [MenuConfig::walk].
pub struct Walk<'a> {
    stack: Vec<(Vec<usize>, NodeRef<'a>)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (Vec<usize>, NodeRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, node) = self.stack.pop()?;
        if let Some(submenu) = node.as_submenu() {
            for (index, child) in submenu.items.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(index);
                self.stack.push((child_path, NodeRef::Child(child)));
            }
        }
        Some((path, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MenuConfig {
        MenuConfig::new(vec![
            Submenu::new("File")
                .item(ActionItem::new("New", || {}))
                .divider()
                .item(Submenu::new("Recent").item(ActionItem::new("a.txt", || {}))),
            Submenu::new("Edit").disabled(true),
        ])
    }

    #[test]
    fn test_node_at_resolves_through_submenus() {
        let config = sample();
        assert_eq!(config.node_at(&[0]).unwrap().as_submenu().unwrap().label, "File");
        assert_eq!(config.node_at(&[0, 0]).unwrap().as_action().unwrap().label, "New");
        assert!(matches!(config.node_at(&[0, 1]), Some(NodeRef::Child(MenuNode::Divider))));
        assert_eq!(config.node_at(&[0, 2, 0]).unwrap().as_action().unwrap().label, "a.txt");
        // cannot descend through a leaf
        assert!(config.node_at(&[0, 0, 0]).is_none());
        assert!(config.node_at(&[]).is_none());
        assert!(config.node_at(&[5]).is_none());
    }

    #[test]
    fn test_walk_is_pre_order() {
        let paths: Vec<Vec<usize>> = sample().walk().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![vec![0], vec![0, 0], vec![0, 1], vec![0, 2], vec![0, 2, 0], vec![1]]
        );
    }

    #[test]
    fn test_disabled_defaults_and_dynamic_flags() {
        let config = sample();
        assert!(!config.top_level(0).unwrap().disabled.get());
        assert!(config.node_at(&[1]).unwrap().is_disabled());

        let flag = DisabledFlag::dynamic(false);
        let shared = flag.clone();
        assert!(shared.set(true));
        assert!(flag.get());
        assert!(!DisabledFlag::Static(false).set(true));
    }

    #[test]
    fn test_empty_submenu_is_not_openable() {
        assert!(!Submenu::new("Empty").is_openable());
        assert!(!sample().top_level(1).unwrap().is_openable());
        assert!(sample().top_level(0).unwrap().is_openable());
    }

    #[test]
    fn test_single_submenu_normalizes_to_config() {
        let config: MenuConfig = Submenu::new("Only").into();
        assert_eq!(config.len(), 1);
        assert!(MenuConfig::default().is_empty());
    }
}
