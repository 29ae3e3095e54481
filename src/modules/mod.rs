pub mod books;

use std::sync::Arc;

use folio_kernel::ModuleRegistry;

/// Register all project modules with the registry
pub fn register_all(
    registry: &mut ModuleRegistry,
    books: Arc<books::BookService>,
) -> anyhow::Result<()> {
    registry.register(books::create_module(books))?;
    Ok(())
}
