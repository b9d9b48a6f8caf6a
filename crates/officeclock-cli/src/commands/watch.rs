//! Interactive live view.
//!
//! Runs on a single-threaded runtime inside a `LocalSet`. The widget
//! state is shared with the tickers through `Rc<RefCell<_>>`; every
//! mutation happens on this one thread, between ticks. Commands are read
//! line by line from stdin.

use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::time::Duration;

use officeclock_core::clock::{self, now_ms};
use officeclock_core::{format, Config, Event, StateStore, Tab, Ticker, WidgetState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;

use super::open_store;

const HELP: &str = "commands: start | stop | focus | pause | reset | minutes <focus> <break> | stats | tab <id> | quit";

pub fn run(config: &Config, for_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config)?;
    let state = store.load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();
    local.block_on(&runtime, Widget::new(store, state).run(for_secs))
}

struct Widget {
    store: StateStore,
    state: Rc<RefCell<WidgetState>>,
    office_ticker: Ticker,
    pomodoro_ticker: Ticker,
}

impl Widget {
    fn new(store: StateStore, state: WidgetState) -> Self {
        Self {
            store,
            state: Rc::new(RefCell::new(state)),
            office_ticker: Ticker::every_second("office"),
            pomodoro_ticker: Ticker::every_second("pomodoro"),
        }
    }

    async fn run(mut self, for_secs: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(event) = self.state.borrow_mut().pomodoro_mut().tick(now_ms()) {
            print_event(&event);
        }
        println!("view: {}", self.store.load_tab()?);
        self.render_office();
        self.render_pomodoro();
        println!("{HELP}");
        self.sync_tickers();

        let deadline = async {
            match for_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                _ = tokio::signal::ctrl_c() => break,
                line = lines.next_line(), if stdin_open => match line? {
                    Some(line) => {
                        if !self.handle(line.trim())? {
                            break;
                        }
                    }
                    None => stdin_open = false,
                },
            }
        }

        self.office_ticker.stop();
        self.pomodoro_ticker.stop();
        // Persist whatever the countdown caught up on.
        self.state.borrow_mut().pomodoro_mut().tick(now_ms());
        self.store.save(&self.state.borrow())?;
        Ok(())
    }

    /// Apply one command line. Returns `false` to quit.
    fn handle(&mut self, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            return Ok(true);
        };
        let now = now_ms();

        let events: Vec<Event> = {
            let mut state = self.state.borrow_mut();
            match cmd {
                "start" => state.start_office(now).into_iter().collect(),
                "stop" => state.stop_office(now).into_iter().collect(),
                "focus" => state.pomodoro_mut().start(now).into_iter().collect(),
                "pause" => state.pomodoro_mut().pause(now),
                "reset" => vec![state.pomodoro_mut().reset(now)],
                "minutes" => {
                    let focus = words.next();
                    let brk = words.next();
                    match state.pomodoro_mut().apply_minute_input(focus, brk) {
                        Ok(applied) => {
                            for rejected in &applied.rejected {
                                println!("ignored invalid minutes ({rejected})");
                            }
                            vec![state.pomodoro().snapshot(now)]
                        }
                        Err(e) => {
                            println!("{e}");
                            Vec::new()
                        }
                    }
                }
                "stats" => {
                    drop(state);
                    self.render_stats();
                    return Ok(true);
                }
                "tab" => {
                    drop(state);
                    match words.next().map(str::parse::<Tab>) {
                        Some(Ok(tab)) => {
                            self.store.save_tab(tab)?;
                            println!("view: {tab}");
                        }
                        Some(Err(e)) => println!("{e}"),
                        None => println!("view: {}", self.store.load_tab()?),
                    }
                    return Ok(true);
                }
                "quit" | "q" | "exit" => return Ok(false),
                _ => {
                    println!("{HELP}");
                    return Ok(true);
                }
            }
        };

        for event in &events {
            print_event(event);
        }
        if !events.is_empty() {
            self.store.save(&self.state.borrow())?;
        }
        self.sync_tickers();
        Ok(true)
    }

    /// Start or stop each ticker to match the state.
    fn sync_tickers(&mut self) {
        let (office_active, pomodoro_running) = {
            let state = self.state.borrow();
            (state.ledger().is_active(), state.pomodoro().is_running())
        };

        if office_active {
            if !self.office_ticker.is_active() {
                let state = Rc::clone(&self.state);
                self.office_ticker.start(move || {
                    let state = state.borrow();
                    if !state.ledger().is_active() {
                        return ControlFlow::Break(());
                    }
                    print_office(&state, now_ms());
                    ControlFlow::Continue(())
                });
            }
        } else if self.office_ticker.is_active() {
            self.office_ticker.stop();
            self.render_office();
        }

        if pomodoro_running {
            if !self.pomodoro_ticker.is_active() {
                let state = Rc::clone(&self.state);
                self.pomodoro_ticker.start(move || {
                    let mut state = state.borrow_mut();
                    if !state.pomodoro().is_running() {
                        return ControlFlow::Break(());
                    }
                    let now = now_ms();
                    if let Some(event) = state.pomodoro_mut().tick(now) {
                        print_event(&event);
                    }
                    print_pomodoro(&state);
                    ControlFlow::Continue(())
                });
            }
        } else {
            self.pomodoro_ticker.stop();
        }
    }

    fn render_office(&self) {
        print_office(&self.state.borrow(), now_ms());
    }

    fn render_pomodoro(&self) {
        print_pomodoro(&self.state.borrow());
    }

    fn render_stats(&self) {
        let s = self.state.borrow().weekly_summary(now_ms());
        println!(
            "week of {}: total {}, per worked day {}, per day {}, per session {}",
            clock::local(s.week.start_ms).format("%Y-%m-%d"),
            format::short(s.total_ms),
            format::short(s.avg_per_worked_day_ms),
            format::short(s.avg_per_week_day_ms),
            format::short(s.avg_session_ms),
        );
    }
}

fn print_office(state: &WidgetState, now: i64) {
    let ledger = state.ledger();
    let status = if ledger.is_active() { "In office" } else { "Not in office" };
    let week = state.weekly_summary(now);
    println!(
        "{status:<14} {}  week {}",
        format::clock(ledger.elapsed_ms(now)),
        format::short(week.total_ms)
    );
}

fn print_pomodoro(state: &WidgetState) {
    let p = state.pomodoro();
    println!(
        "{:<6} {}  {}  completed {}",
        format!("{:?}", p.mode()).to_lowercase(),
        format::countdown(p.remaining_ms()),
        if p.is_running() { "running" } else { "paused" },
        p.completed_focus_sessions()
    );
}

fn print_event(event: &Event) {
    match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "could not render event"),
    }
}
