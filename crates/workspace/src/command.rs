/// User-facing workspace commands.
///
/// Each command has an enablement predicate (`Workspace::can_execute`) and an
/// effect (`Workspace::execute`). Selection changes are plain setters on the
/// workspace and are not listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceCommand {
    CreateTable,
    EditTable,
    DeleteTable,
    CompleteTable,
    AddOrderItem,
    RemoveOrderItem,
}

impl WorkspaceCommand {
    pub const ALL: [WorkspaceCommand; 6] = [
        WorkspaceCommand::CreateTable,
        WorkspaceCommand::EditTable,
        WorkspaceCommand::DeleteTable,
        WorkspaceCommand::CompleteTable,
        WorkspaceCommand::AddOrderItem,
        WorkspaceCommand::RemoveOrderItem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            WorkspaceCommand::CreateTable => "create_table",
            WorkspaceCommand::EditTable => "edit_table",
            WorkspaceCommand::DeleteTable => "delete_table",
            WorkspaceCommand::CompleteTable => "complete_table",
            WorkspaceCommand::AddOrderItem => "add_order_item",
            WorkspaceCommand::RemoveOrderItem => "remove_order_item",
        }
    }
}

impl core::fmt::Display for WorkspaceCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
