use ewaste_core::domain::recycler::RecyclerDirectory;

use crate::commands::CommandResult;

pub fn run() -> CommandResult {
    let directory = RecyclerDirectory::default();
    CommandResult::success_with_data(
        "recyclers",
        format!("{} recyclers accept pickups", directory.all().len()),
        &directory.all(),
    )
}
