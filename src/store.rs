use crate::models::Task;
use crate::storage::Storage;

/// In-memory ordered task list mirrored to storage after every mutation.
///
/// Indices are positional: contiguous `0..len`, re-derived after every
/// insert and delete. Callers must only pass indices obtained from the
/// current render; stale indices no-op.
pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Storage,
}

impl TaskStore {
    /// Loads whatever the storage slot holds; malformed or absent data
    /// starts the list empty.
    pub fn open(storage: Storage) -> Self {
        let tasks = storage.load_tasks();
        Self { tasks, storage }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Appends a task with the trimmed text. Empty or whitespace-only text
    /// is a silent no-op.
    pub fn create(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.tasks.push(Task::new(text));
        self.persist();
    }

    pub fn toggle_complete(&mut self, index: usize) {
        if let Some(task) = self.tasks.get_mut(index) {
            task.completed = !task.completed;
            self.persist();
        }
    }

    /// Replaces the text at `index` with the trimmed new text. An empty
    /// result discards the edit: the original text stays and nothing is
    /// written.
    pub fn rename(&mut self, index: usize, new_text: &str) {
        let new_text = new_text.trim();
        if new_text.is_empty() {
            return;
        }
        if let Some(task) = self.tasks.get_mut(index) {
            task.text = new_text.to_string();
            self.persist();
        }
    }

    /// Removes the task at `index`, shifting all later indices down by one.
    pub fn delete_at(&mut self, index: usize) {
        if index < self.tasks.len() {
            self.tasks.remove(index);
            self.persist();
        }
    }

    pub fn delete_all(&mut self) {
        self.tasks.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save_tasks(&self.tasks) {
            log::warn!("failed to persist tasks: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::summarize;

    fn open_store(dir: &tempfile::TempDir) -> TaskStore {
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");
        TaskStore::open(storage)
    }

    fn temp_store() -> (tempfile::TempDir, TaskStore) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = open_store(&dir);
        (dir, store)
    }

    #[test]
    fn create_then_summarize_counts_one_remaining() {
        let (_dir, mut store) = temp_store();
        store.create("write tests");
        assert_eq!(summarize(store.tasks()), "1 remaining, 0 completed");
    }

    #[test]
    fn create_trims_surrounding_whitespace() {
        let (_dir, mut store) = temp_store();
        store.create("  padded  ");
        assert_eq!(store.tasks()[0].text, "padded");
    }

    #[test]
    fn create_ignores_empty_and_whitespace_input() {
        let (_dir, mut store) = temp_store();
        store.create("");
        store.create("   ");
        store.create("\t\n");
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn toggle_twice_restores_original_flag() {
        let (_dir, mut store) = temp_store();
        store.create("a");
        store.create("b");
        store.toggle_complete(1);
        assert!(store.tasks()[1].completed);
        store.toggle_complete(1);
        assert!(!store.tasks()[1].completed);
    }

    #[test]
    fn toggle_out_of_range_is_a_no_op() {
        let (_dir, mut store) = temp_store();
        store.create("only");
        store.toggle_complete(5);
        assert!(!store.tasks()[0].completed);
    }

    #[test]
    fn delete_shifts_later_indices_down() {
        let (_dir, mut store) = temp_store();
        store.create("A");
        store.create("B");
        store.create("C");
        store.delete_at(1);
        let texts: Vec<&str> = store.tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["A", "C"]);
        assert_eq!(store.tasks()[1].text, "C");
    }

    #[test]
    fn rename_replaces_text() {
        let (_dir, mut store) = temp_store();
        store.create("draft");
        store.rename(0, "  final  ");
        assert_eq!(store.tasks()[0].text, "final");
    }

    #[test]
    fn rename_with_empty_text_discards_the_edit() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = open_store(&dir);
        store.create("keep me");
        store.rename(0, "   ");
        assert_eq!(store.tasks()[0].text, "keep me");

        // No functional change was written either.
        let reopened = open_store(&dir);
        assert_eq!(reopened.tasks(), store.tasks());
    }

    #[test]
    fn delete_all_empties_the_list() {
        let (_dir, mut store) = temp_store();
        store.create("a");
        store.create("b");
        store.delete_all();
        assert!(store.is_empty());
    }

    #[test]
    fn mutations_survive_reopen() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut store = open_store(&dir);
        store.create("persist me");
        store.create("and me");
        store.toggle_complete(0);
        store.delete_at(1);
        drop(store);

        let reopened = open_store(&dir);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.tasks()[0].text, "persist me");
        assert!(reopened.tasks()[0].completed);
    }
}
