//! list command - List units in the specs directory

use anyhow::Result;

use super::Workspace;
use crate::core::declaration::DeclarationStore;
use crate::engine::Context;
use crate::ui::output;

/// List unit names, one per line.
///
/// Names come from `function-<name>.yaml` files. With `--json` the list is
/// printed as a JSON array.
pub fn list(ctx: &Context) -> Result<()> {
    let ws = Workspace::open(ctx)?;
    let units = DeclarationStore::new(&ws.paths).list_units()?;

    if ctx.json {
        return output::json(&units);
    }

    if units.is_empty() {
        output::print("No units found.", ws.verbosity);
        return Ok(());
    }
    for unit in &units {
        println!("{}", unit);
    }
    Ok(())
}
