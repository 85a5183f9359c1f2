//! Popup -> background -> content -> page and back, over the mock page

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use ab_hal::PointerEvent;
use ab_hal_mock::{ElementSpec, MockElement, MockPage};
use ab_ipc::{AnimationData, AnimationType, Command, CommandAck, ControllerEvent, PageMessage, Response, TargetElement};
use ab_page::{PageAgent, PageConfig, SelectionState};
use ab_relay::{BackgroundRelay, ContentRelay, RelayConfig, RelayError, RuntimePort, TabId, TabTransport};
use ab_studio::testing::ManualTimers;
use ab_studio::{AnimationRequest, PageLink, Studio, StudioConfig};
use async_trait::async_trait;
use futures::executor::block_on;

/// Content realm's runtime channel
#[derive(Clone, Default)]
struct EventSink(Rc<RefCell<Vec<ControllerEvent>>>);

#[async_trait(?Send)]
impl RuntimePort for EventSink {
    async fn send_event(&self, event: &ControllerEvent) -> Result<(), RelayError> {
        self.0.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// One tab: the page, its injected agent and its content relay
struct Tab {
    page: Rc<MockPage>,
    agent: RefCell<PageAgent<MockPage>>,
    content: ContentRelay<MockPage, EventSink>,
    outbox: EventSink,
    delivered: RefCell<Vec<PageMessage>>,
}

impl Tab {
    fn new(page: Rc<MockPage>) -> Rc<Self> {
        let outbox = EventSink::default();
        Rc::new(Self {
            agent: RefCell::new(PageAgent::new(Rc::clone(&page), PageConfig::default())),
            content: ContentRelay::new(Rc::clone(&page), outbox.clone(), PageConfig::default()),
            page,
            outbox,
            delivered: RefCell::new(Vec::new()),
        })
    }

    /// Deliver window broadcasts to every listener until the channel is quiet
    async fn pump(&self) {
        loop {
            let posted = self.page.take_posted();
            if posted.is_empty() {
                break;
            }
            for message in posted {
                self.delivered.borrow_mut().push(message.clone());
                self.agent.borrow_mut().handle_message(message.clone());
                self.content.handle_page_message(message).await;
            }
        }
    }

    fn click(&self, element: MockElement) {
        let mut agent = self.agent.borrow_mut();
        agent.on_pointer(PointerEvent::Over(element));
        agent.on_pointer(PointerEvent::Click(element));
    }

    fn animate_messages(&self) -> Vec<(String, AnimationData)> {
        self.delivered
            .borrow()
            .iter()
            .filter_map(|m| match m {
                PageMessage::Animate {
                    element_id,
                    animation,
                } => Some((element_id.clone(), animation.clone())),
                _ => None,
            })
            .collect()
    }
}

struct MockTabs {
    tab: Option<Rc<Tab>>,
    injected: Cell<bool>,
    injections: Cell<usize>,
    slept: RefCell<Vec<Duration>>,
    to_controller: RefCell<Vec<ControllerEvent>>,
}

impl MockTabs {
    fn new(tab: Option<Rc<Tab>>) -> Self {
        Self {
            tab,
            injected: Cell::new(false),
            injections: Cell::new(0),
            slept: RefCell::new(Vec::new()),
            to_controller: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl TabTransport for MockTabs {
    async fn active_tab(&self) -> Result<TabId, RelayError> {
        self.tab.as_ref().map(|_| TabId(1)).ok_or(RelayError::NoActiveTab)
    }

    async fn send_to_tab(&self, _tab: TabId, command: &Command) -> Result<Response, RelayError> {
        let tab = self.tab.as_ref().ok_or(RelayError::NoActiveTab)?;
        if !self.injected.get() {
            return Err(RelayError::NoReceiver);
        }
        let response = tab.content.handle_command(command);
        tab.pump().await;
        Ok(response)
    }

    async fn inject_content_script(&self, _tab: TabId, _file: &str) -> Result<(), RelayError> {
        self.injections.set(self.injections.get() + 1);
        self.injected.set(true);
        Ok(())
    }

    async fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }

    async fn notify_controller(&self, event: &ControllerEvent) -> Result<(), RelayError> {
        self.to_controller.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Popup side of the runtime channel
struct BackgroundLink(Rc<BackgroundRelay<MockTabs>>);

impl BackgroundLink {
    async fn ack(&self, command: Command) -> CommandAck {
        match self.0.handle_command(command).await {
            Response::Ack(ack) => ack,
            Response::Elements(_) => CommandAck {
                success: true,
                error: None,
            },
        }
    }
}

#[async_trait(?Send)]
impl PageLink for BackgroundLink {
    async fn start_element_selection(&self) -> CommandAck {
        self.ack(Command::StartElementSelection).await
    }

    async fn stop_element_selection(&self) -> CommandAck {
        self.ack(Command::StopElementSelection).await
    }

    async fn animate_element(&self, selector: &str, animation: &AnimationData) -> CommandAck {
        self.ack(Command::AnimateElement {
            element_id: selector.to_string(),
            animation: animation.clone(),
        })
        .await
    }

    async fn reset_element(&self, selector: &str) -> CommandAck {
        self.ack(Command::ResetElement {
            element_id: selector.to_string(),
        })
        .await
    }

    async fn page_elements(&self) -> Vec<TargetElement> {
        self.0.handle_command(Command::GetPageElements).await.into_elements()
    }
}

struct World {
    tab: Rc<Tab>,
    background: Rc<BackgroundRelay<MockTabs>>,
    timers: Rc<ManualTimers>,
    studio: Studio<BackgroundLink, Rc<ManualTimers>>,
}

impl World {
    fn new(page: MockPage) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let tab = Tab::new(Rc::new(page));
        let background = Rc::new(BackgroundRelay::new(
            MockTabs::new(Some(Rc::clone(&tab))),
            RelayConfig::default(),
        ));
        let timers = Rc::new(ManualTimers::new());
        let studio = Studio::new(
            Rc::new(BackgroundLink(Rc::clone(&background))),
            Rc::clone(&timers),
            StudioConfig::default(),
        );
        Self {
            tab,
            background,
            timers,
            studio,
        }
    }

    /// Carry selection events content -> background -> popup
    fn route_events(&self) {
        let events: Vec<_> = self.tab.outbox.0.borrow_mut().drain(..).collect();
        for event in events {
            block_on(self.background.handle_event(event));
        }
        let to_popup: Vec<_> = self
            .background
            .transport()
            .to_controller
            .borrow_mut()
            .drain(..)
            .collect();
        for event in to_popup {
            self.studio.handle_event(event);
        }
    }
}

#[test]
fn test_select_add_play_reaches_executor_once() {
    let page = MockPage::new();
    let button = page.append_to_body_spec(ElementSpec::new("button").id("cta-button").text("Get started"));
    let world = World::new(page);

    assert!(block_on(world.studio.start_selection()).success);
    assert_eq!(world.tab.agent.borrow().selection_state(), SelectionState::Selecting);

    world.tab.click(button);
    block_on(world.tab.pump());
    world.route_events();
    assert_eq!(world.tab.agent.borrow().selection_state(), SelectionState::Idle);

    let state = world.studio.state();
    assert_eq!(state.selected_elements.len(), 1);
    assert_eq!(state.selected_elements[0].selector, "#cta-button");

    block_on(world.studio.add_animation(&AnimationRequest {
        preset_id: "fade-in".to_string(),
        duration: Some(0.8),
        delay: Some(0.0),
        target: Some("cta-button".to_string()),
        ..AnimationRequest::default()
    }))
    .unwrap();
    world.tab.delivered.borrow_mut().clear();

    world.studio.play();
    world.timers.advance(Duration::from_secs(1));

    let animations = world.tab.animate_messages();
    assert_eq!(animations.len(), 1);
    let (selector, data) = &animations[0];
    assert_eq!(selector, "#cta-button");
    assert_eq!(data.kind, AnimationType::Fade);
    assert_eq!(data.duration, 0.8);
    assert_eq!(data.delay, 0.0);
    assert_eq!(data.easing, "ease-out");

    world.tab.page.run_due_timers();
    assert_eq!(world.tab.page.style(&button, "opacity"), "1");

    block_on(world.studio.reset());
    assert_eq!(world.tab.page.style(&button, "opacity"), "");
    assert_eq!(world.tab.page.style(&button, "transition"), "");
}

#[test]
fn test_content_script_injected_once_on_demand() {
    let page = MockPage::new();
    page.append_to_body_spec(ElementSpec::new("h1").text("Pricing"));
    let world = World::new(page);

    let elements = block_on(world.studio.load_page_elements());
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].tag_name, "H1");

    block_on(world.studio.stop_selection());
    let tabs = world.background.transport();
    assert_eq!(tabs.injections.get(), 1);
    assert_eq!(*tabs.slept.borrow(), vec![Duration::from_millis(100)]);
}

#[test]
fn test_missing_tab_degrades_gracefully() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let background = Rc::new(BackgroundRelay::new(MockTabs::new(None), RelayConfig::default()));
    let studio = Studio::new(
        Rc::new(BackgroundLink(background)),
        Rc::new(ManualTimers::new()),
        StudioConfig::default(),
    );

    assert!(block_on(studio.load_page_elements()).is_empty());
    let ack = block_on(studio.start_selection());
    assert!(!ack.success);
    assert!(ack.error.is_some());
    assert!(!studio.is_selecting());
}
