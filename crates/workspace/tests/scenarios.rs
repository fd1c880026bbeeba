use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::task::LocalSet;

use tableside_catalog::{CatalogSource, Product, StaticCatalog};
use tableside_dining::Table;
use tableside_workspace::{
    Dialog, TablesTab, Workspace, WorkspaceCommand, WorkspaceConfig, WorkspaceEvent,
    WorkspaceProperty, normalize_input,
};

/// Dialog double answering prompts from a script and recording messages.
#[derive(Clone, Default)]
struct ScriptedDialog {
    inputs: Rc<RefCell<VecDeque<String>>>,
    confirms: Rc<RefCell<VecDeque<bool>>>,
    prompts: Rc<RefCell<Vec<(String, String, Option<String>)>>>,
    messages: Rc<RefCell<Vec<(String, String)>>>,
}

impl ScriptedDialog {
    fn answer(&self, text: &str) -> &Self {
        self.inputs.borrow_mut().push_back(text.to_string());
        self
    }

    fn confirm_next(&self, yes: bool) -> &Self {
        self.confirms.borrow_mut().push_back(yes);
        self
    }

    fn messages(&self) -> Vec<(String, String)> {
        self.messages.borrow().clone()
    }

    fn message_titles(&self) -> Vec<String> {
        self.messages().into_iter().map(|(title, _)| title).collect()
    }
}

impl Dialog for ScriptedDialog {
    fn try_get_input(&self, title: &str, prompt: &str, initial: Option<&str>) -> Option<String> {
        self.prompts.borrow_mut().push((
            title.to_string(),
            prompt.to_string(),
            initial.map(str::to_string),
        ));
        let next = self.inputs.borrow_mut().pop_front();
        normalize_input(next.as_deref())
    }

    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirms.borrow_mut().pop_front().unwrap_or(false)
    }

    fn show_message(&self, title: &str, message: &str) {
        self.messages
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

struct FailingCatalog;

#[async_trait(?Send)]
impl CatalogSource for FailingCatalog {
    async fn load_products(&self) -> anyhow::Result<Vec<Product>> {
        anyhow::bail!("catalog unavailable")
    }
}

fn run<F: std::future::Future>(future: F) -> F::Output {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();
    LocalSet::new().block_on(&runtime, future)
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn menu() -> Vec<Product> {
    vec![
        Product::new(1, "Tea", dec("2.50")),
        Product::new(2, "Pie", dec("4.00")),
    ]
}

async fn workspace_with_menu() -> (Workspace, ScriptedDialog, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let dialog = ScriptedDialog::default();
    let config = WorkspaceConfig::default().with_base_dir(dir.path());
    let mut ws = Workspace::new(Box::new(dialog.clone()), config);
    ws.load_products(&StaticCatalog::new(menu())).await;
    (ws, dialog, dir)
}

fn create(ws: &mut Workspace, dialog: &ScriptedDialog, name: &str) {
    dialog.answer(name);
    ws.execute(WorkspaceCommand::CreateTable);
}

fn add(ws: &mut Workspace, name: &str) {
    let product = ws
        .products()
        .iter()
        .find(|p| p.name == name)
        .cloned()
        .unwrap();
    ws.set_selected_product(Some(product));
    ws.execute(WorkspaceCommand::AddOrderItem);
}

fn names(tables: &[Table]) -> Vec<String> {
    tables.iter().map(Table::name).collect()
}

#[test]
fn repeated_product_merges_into_one_line() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        add(&mut ws, "Tea");
        add(&mut ws, "Tea");
        add(&mut ws, "Pie");

        let table = &ws.open_tables()[0];
        assert_eq!(table.order_count(), 1);
        let order = table.first_order().unwrap();
        let lines: Vec<_> = order
            .items()
            .iter()
            .map(|i| (i.name(), i.price(), i.quantity(), i.total()))
            .collect();
        assert_eq!(
            lines,
            vec![
                ("Tea".to_string(), dec("2.50"), 2, dec("5.00")),
                ("Pie".to_string(), dec("4.00"), 1, dec("4.00")),
            ]
        );
        assert_eq!(order.total(), dec("9.00"));
        assert_eq!(ws.status_message(), "Added \"Pie\" to order");
        assert!(ws.selected_product().is_none());
        assert_eq!(ws.product_search_text(), "");
    });
}

#[test]
fn removing_selected_item_updates_total_and_clears_selection() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        add(&mut ws, "Tea");
        add(&mut ws, "Tea");
        add(&mut ws, "Pie");

        let order = ws.selected_order().cloned().unwrap();
        let tea = order.items()[0].clone();
        ws.set_selected_order_item(Some(tea));
        ws.execute(WorkspaceCommand::RemoveOrderItem);

        let remaining: Vec<_> = order.items().iter().map(|i| i.name()).collect();
        assert_eq!(remaining, vec!["Pie"]);
        assert_eq!(order.total(), dec("4.00"));
        assert!(ws.selected_order_item().is_none());
        assert_eq!(ws.status_message(), "Removed \"Tea\" from order");
    });
}

#[test]
fn duplicate_name_is_rejected_ignoring_case() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        create(&mut ws, &dialog, "t1");

        assert_eq!(
            dialog.messages(),
            vec![(
                "Duplicate Name".to_string(),
                "A table named \"t1\" already exists.".to_string()
            )]
        );
        assert_eq!(names(ws.open_tables()), vec!["T1"]);
    });
}

#[test]
fn deleting_selected_table_selects_first_remaining() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        create(&mut ws, &dialog, "T2");
        assert_eq!(ws.selected_table().map(Table::name).as_deref(), Some("T2"));

        dialog.confirm_next(true);
        ws.execute(WorkspaceCommand::DeleteTable);

        assert_eq!(names(ws.open_tables()), vec!["T1"]);
        assert_eq!(ws.selected_table().map(Table::name).as_deref(), Some("T1"));
        assert!(ws.selected_order().is_none());
        assert_eq!(ws.status_message(), "Deleted \"T2\"");
    });
}

#[test]
fn completed_table_becomes_read_only() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        add(&mut ws, "Tea");
        assert!(ws.can_execute(WorkspaceCommand::CompleteTable));

        ws.execute(WorkspaceCommand::CompleteTable);

        assert!(ws.open_tables().is_empty());
        assert_eq!(names(ws.completed_tables()), vec!["T1"]);
        assert_eq!(ws.tables_tab_index(), 1);
        assert_eq!(ws.selected_table().map(Table::name).as_deref(), Some("T1"));
        assert!(!ws.can_modify_selection());
        assert!(!ws.can_execute(WorkspaceCommand::AddOrderItem));
        assert_eq!(ws.status_message(), "Completed \"T1\"");

        let total = ws.completed_tables()[0].first_order().unwrap().total();
        add(&mut ws, "Pie");
        assert_eq!(
            ws.completed_tables()[0].first_order().unwrap().total(),
            total
        );
        assert!(!ws.set_selected_item_quantity(5));
    });
}

#[test]
fn completing_empty_table_is_refused() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        ws.execute(WorkspaceCommand::CompleteTable);

        assert_eq!(dialog.message_titles(), vec!["Cannot complete"]);
        assert_eq!(
            dialog.messages()[0].1,
            "Cannot complete — add at least one item before completing the table."
        );
        assert_eq!(names(ws.open_tables()), vec!["T1"]);
        assert!(ws.completed_tables().is_empty());
    });
}

#[test]
fn rename_prompt_is_prefilled_with_current_name() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        dialog.answer("Patio");
        ws.execute(WorkspaceCommand::EditTable);

        let prompts = dialog.prompts.borrow().clone();
        assert_eq!(
            prompts,
            vec![
                ("New Table".to_string(), "Table name:".to_string(), None),
                (
                    "Rename Table".to_string(),
                    "Table name:".to_string(),
                    Some("T1".to_string())
                ),
            ]
        );
        assert_eq!(names(ws.open_tables()), vec!["Patio"]);
    });
}

#[test]
fn selecting_table_cascades_to_order_and_item() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        add(&mut ws, "Tea");
        create(&mut ws, &dialog, "T2");
        assert!(ws.selected_order().is_none());
        assert!(ws.selected_order_item().is_none());

        let events = ws.changes().listen();
        let t1 = ws.open_tables()[0].clone();
        ws.set_selected_table(Some(t1.clone()));

        assert_eq!(ws.selected_order(), t1.first_order().as_ref());
        assert!(ws.selected_order_item().is_none());

        let events = events.drain();
        assert!(events.contains(&WorkspaceEvent::Property(WorkspaceProperty::SelectedTable)));
        assert!(events.contains(&WorkspaceEvent::Property(
            WorkspaceProperty::CanModifySelection
        )));
        assert!(events.contains(&WorkspaceEvent::CommandsInvalidated));

        // Same table again is a no-op.
        let events = ws.changes().listen();
        ws.set_selected_table(Some(t1));
        assert!(events.drain().is_empty());
    });
}

#[test]
fn switching_tabs_keeps_selection_coherent() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        create(&mut ws, &dialog, "T2");
        add(&mut ws, "Tea");
        ws.execute(WorkspaceCommand::CompleteTable);
        assert_eq!(ws.tables_tab(), TablesTab::Completed);

        ws.set_tables_tab_index(0).unwrap();
        assert_eq!(ws.selected_table().map(Table::name).as_deref(), Some("T1"));
        assert!(ws.can_modify_selection());

        ws.set_tables_tab(TablesTab::Completed);
        assert_eq!(ws.selected_table().map(Table::name).as_deref(), Some("T2"));
        assert!(!ws.can_modify_selection());

        ws.set_selected_table(None);
        ws.set_tables_tab(TablesTab::Open);
        assert!(ws.selected_table().is_none());
    });
}

#[test]
fn status_message_clears_after_configured_duration() {
    run(async {
        let dialog = ScriptedDialog::default();
        let config = WorkspaceConfig::default()
            .with_base_dir(std::env::temp_dir())
            .with_status_duration(Duration::from_millis(500));
        let mut ws = Workspace::new(Box::new(dialog.clone()), config);

        create(&mut ws, &dialog, "T1");
        tokio::time::sleep(Duration::from_millis(300)).await;
        create(&mut ws, &dialog, "T2");
        assert_eq!(ws.status_message(), "Created table \"T2\"");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(ws.status_message(), "Created table \"T2\"");

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(ws.status_message(), "");
    });
}

#[test]
fn json_catalog_loads_and_selects_first_product() {
    run(async {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Data")).unwrap();
        std::fs::write(
            dir.path().join("Data").join("products.json"),
            r#"[{"Id":1,"Name":"Tea","Price":2.50},{"id":2,"name":"Pie","price":4.00}]"#,
        )
        .unwrap();

        let config = WorkspaceConfig::default().with_base_dir(dir.path());
        let catalog = config.catalog();
        let mut ws = Workspace::new(Box::new(ScriptedDialog::default()), config);
        ws.load_products(&catalog).await;

        assert_eq!(ws.products().len(), 2);
        assert_eq!(ws.selected_product().map(|p| p.name.as_str()), Some("Tea"));
        assert_eq!(ws.products_view().count(), 2);
    });
}

#[test]
fn catalog_failure_leaves_products_empty() {
    run(async {
        let mut ws = Workspace::new(
            Box::new(ScriptedDialog::default()),
            WorkspaceConfig::default().with_base_dir(std::env::temp_dir()),
        );
        ws.load_products(&FailingCatalog).await;

        assert!(ws.products().is_empty());
        assert!(ws.selected_product().is_none());
    });
}

#[test]
fn snapshot_serializes_tables_and_totals() {
    run(async {
        let (mut ws, dialog, _dir) = workspace_with_menu().await;
        create(&mut ws, &dialog, "T1");
        add(&mut ws, "Tea");

        let json = serde_json::to_value(ws.snapshot()).unwrap();
        assert_eq!(json["open_tables"][0]["name"], "T1");
        assert_eq!(json["tables_tab"], "open");
        assert_eq!(json["selected_table"], "T1");
        assert!(json["completed_tables"].as_array().unwrap().is_empty());
    });
}
