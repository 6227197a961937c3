use anyhow::Result;

use crate::{
    display_backend::StatusSink,
    field::{FieldId, FieldStore},
    registry::{Action, ActionId, ActionRegistry},
    render, shell,
};

/// The daemon context: all field buffers, the action table, the running flag
/// and the publish sink. Everything here is touched from the single dispatch
/// thread only.
pub struct App {
    pub store: FieldStore,
    pub registry: ActionRegistry,
    pub sink: Box<dyn StatusSink>,
    pub running: bool,
}

/// What a single action resolved to, copied out of the registry so the
/// borrow on it ends before any field is written.
enum Invocation {
    Capture(&'static str, Option<FieldId>),
    Label { command: &'static str, label: &'static str, target: FieldId },
    Sequence(Vec<ActionId>, bool),
}

impl App {
    pub fn new(registry: ActionRegistry, sink: Box<dyn StatusSink>) -> Self {
        App { store: FieldStore::new(), registry, sink, running: true }
    }

    /// Run every external and toggle action once so all fields hold a value,
    /// then publish the first status line.
    pub async fn init_statusbar(&mut self) -> Result<()> {
        let startup: Vec<ActionId> = self
            .registry
            .action_ids()
            .filter(|&id| !matches!(self.registry.get(id), Action::Composite { .. }))
            .collect();
        for action_id in startup {
            self.run_action(action_id).await?;
        }
        self.render()
    }

    /// Dispatch one wire-level request id: resolve it through the request
    /// table, run the action, publish a fresh status line. An out-of-bounds
    /// id is a client mistake and only worth a log line.
    pub async fn handle_request(&mut self, id: u32) -> Result<()> {
        let Some(action_id) = self.registry.request(id) else {
            log::warn!("Received id out of bounds: {}. Size is: {}.", id, self.registry.request_count());
            return Ok(());
        };
        self.run_action(action_id).await?;
        self.render()
    }

    async fn run_action(&mut self, id: ActionId) -> Result<()> {
        let invocation = match self.registry.get_mut(id) {
            Action::External { command, target } => Invocation::Capture(*command, *target),
            Action::Toggle { pair, state, target } => {
                *state = 1 - *state;
                Invocation::Label { command: pair.commands[*state], label: pair.labels[*state], target: *target }
            }
            Action::Composite { steps, quit } => Invocation::Sequence(steps.clone(), *quit),
        };

        match invocation {
            Invocation::Capture(command, target) => {
                let line = shell::run_capture_first_line(command).await?;
                if let Some(target) = target {
                    self.store.write(target, &line);
                }
            }
            Invocation::Label { command, label, target } => {
                // The side-effect command may still be running when the new
                // label shows up; the label reflects intent, not completion.
                shell::run_detached(command)?;
                self.store.write(target, label.as_bytes());
            }
            Invocation::Sequence(steps, quit) => {
                if quit {
                    log::info!("Got quit request. Terminating...");
                    self.running = false;
                }
                for step in steps {
                    Box::pin(self.run_action(step)).await?;
                }
            }
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let line = render::format_status(&self.store);
        self.sink.publish(&line)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::{ActionRegistryBuilder, TogglePair};
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl StatusSink for RecordingSink {
        fn publish(&mut self, status: &str) -> Result<()> {
            self.0.borrow_mut().push(status.to_string());
            Ok(())
        }
    }

    fn recording_app(registry: ActionRegistry) -> (App, Rc<RefCell<Vec<String>>>) {
        let published = Rc::new(RefCell::new(Vec::new()));
        let app = App::new(registry, Box::new(RecordingSink(published.clone())));
        (app, published)
    }

    fn lang_pair() -> TogglePair {
        TogglePair { labels: ["US", "RO"], commands: ["true", "true"] }
    }

    #[tokio::test]
    async fn valid_request_runs_the_action_and_renders_once() {
        let mut builder = ActionRegistryBuilder::new();
        let quit = builder.quit();
        let time = builder.external("printf '10:00:00'", FieldId::Time);
        let registry = builder.build(vec![quit, time]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.handle_request(1).await.unwrap();

        assert_eq!(app.store.read(FieldId::Time).content(), b"10:00:00");
        assert_eq!(published.borrow().len(), 1);
        assert!(published.borrow()[0].starts_with("[10:00:00 |"));
    }

    #[tokio::test]
    async fn out_of_bounds_request_neither_mutates_nor_renders() {
        let mut builder = ActionRegistryBuilder::new();
        let quit = builder.quit();
        let registry = builder.build(vec![quit]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.handle_request(99).await.unwrap();

        assert!(app.running);
        assert!(published.borrow().is_empty());
        assert!(app.store.read(FieldId::Time).is_empty());
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_field() {
        let mut builder = ActionRegistryBuilder::new();
        let quit = builder.quit();
        let lang = builder.toggle(lang_pair(), FieldId::Lang);
        let registry = builder.build(vec![quit, lang]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.handle_request(1).await.unwrap();
        let first = app.store.read(FieldId::Lang).content().to_vec();
        assert_eq!(first, b"US");

        app.handle_request(1).await.unwrap();
        assert_eq!(app.store.read(FieldId::Lang).content(), b"RO");
        app.handle_request(1).await.unwrap();
        assert_eq!(app.store.read(FieldId::Lang).content(), first.as_slice());
        assert_eq!(published.borrow().len(), 3);
    }

    #[tokio::test]
    async fn quit_request_clears_the_running_flag_and_still_renders() {
        let mut builder = ActionRegistryBuilder::new();
        let quit = builder.quit();
        let registry = builder.build(vec![quit]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.handle_request(0).await.unwrap();

        assert!(!app.running);
        assert_eq!(published.borrow().len(), 1);
    }

    #[tokio::test]
    async fn composite_runs_steps_in_order_with_one_render_at_the_end() {
        let mut builder = ActionRegistryBuilder::new();
        let quit = builder.quit();
        // All three write the same field; the last step decides its content.
        let first = builder.external("printf 'first'", FieldId::Time);
        let second = builder.external("printf 'second'", FieldId::Time);
        let third = builder.external("printf 'third'", FieldId::Time);
        let refresh = builder.composite(vec![first, second, third]).unwrap();
        let registry = builder.build(vec![quit, refresh]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.handle_request(1).await.unwrap();

        assert_eq!(app.store.read(FieldId::Time).content(), b"third");
        assert_eq!(published.borrow().len(), 1);
    }

    #[tokio::test]
    async fn init_statusbar_populates_every_targeted_field_and_renders_once() {
        let mut builder = ActionRegistryBuilder::new();
        let time = builder.external("printf '10:00:00'", FieldId::Time);
        let lang = builder.toggle(lang_pair(), FieldId::Lang);
        let refresh = builder.composite(vec![time]).unwrap();
        let quit = builder.quit();
        let registry = builder.build(vec![quit, lang, refresh]).unwrap();
        let (mut app, published) = recording_app(registry);

        app.init_statusbar().await.unwrap();

        assert_eq!(app.store.read(FieldId::Time).content(), b"10:00:00");
        assert_eq!(app.store.read(FieldId::Lang).content(), b"US");
        assert_eq!(published.borrow().len(), 1);
    }
}
