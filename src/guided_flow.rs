//! Guided flow: the menu-driven portion of the conversation
//!
//! A small finite state machine offering fixed choices that lead either to
//! a sub-menu or to a terminal message carrying a hard-coded link into the
//! Trust Inheritance site. Terminal choices deactivate the flow; free-form
//! chat takes over from there.

use crate::state::SessionState;
use crate::view::{ChatView, Role};

/// Steps of the guided flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidedStep {
    Root,
    /// Free-form chat; no options are offered at this step
    Chat,
    Legal,
    Will,
    Lpa,
    Bereavement,
    Final,
}

/// What the chat orchestrator should do after an option was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Flow handled the choice (or ignored an unknown label)
    Continue,
    /// The user asked to see their questionnaire submissions
    CheckSubmissions,
}

/// Link targets for terminal flow choices
mod links {
    pub const LIVING_WILL: &str =
        "https://trustinheritance.toolboxx.co.uk/living-will/5999/questionnaire/step/2";
    pub const SELECT_WILL: &str = "https://trustinheritance.toolboxx.co.uk/select-will";
    pub const SELECT_LPA: &str = "https://trustinheritance.toolboxx.co.uk/select-lpa";

    pub const BEREAVEMENT: &[(&str, &str)] = &[
        (
            "A Little Help",
            "https://trustinheritance.toolboxx.co.uk/holder/10-steps",
        ),
        (
            "A Little More Help",
            "https://trustinheritance.toolboxx.co.uk/what-to-do-when-someone-dies/2808/questionnaire/step/11",
        ),
        (
            "Lots of Help",
            "https://trustinheritance.toolboxx.co.uk/payment/executor-toolkit-plus/5175",
        ),
        (
            "Hand It All Over",
            "https://trustinheritance.toolboxx.co.uk/estate-administration",
        ),
        (
            "Online Grief Support",
            "https://trustinheritance.toolboxx.co.uk/grief-support",
        ),
    ];

    pub const FINAL_WISHES: &[(&str, &str)] = &[
        (
            "My Documents",
            "https://trustinheritance.toolboxx.co.uk/mydigifile",
        ),
        (
            "Personal Messages",
            "https://trustinheritance.toolboxx.co.uk/payment/personal-message",
        ),
        (
            "Funeral Wishes",
            "https://trustinheritance.toolboxx.co.uk/payment/what-to-do-when-planning-your-funeral",
        ),
        (
            "Digital Legacy",
            "https://trustinheritance.toolboxx.co.uk/payment/digital-assets",
        ),
        (
            "Trusted People",
            "https://trustinheritance.toolboxx.co.uk/profile#tab-trusted",
        ),
        ("Nags", "https://trustinheritance.toolboxx.co.uk/nags"),
    ];
}

const CHECK_SUBMISSIONS: &str = "Check Submissions";
const CONTACT_MODES: [&str; 3] = ["Online", "Telephone", "Video"];

/// Options offered at a step, None when the step has no menu
pub fn options_for(step: GuidedStep) -> Option<Vec<String>> {
    let options: &[&str] = match step {
        GuidedStep::Root => &[
            "Legal Document Support",
            "Bereavement Support",
            "Final Wishes Support",
            CHECK_SUBMISSIONS,
        ],
        GuidedStep::Legal => &[
            "Will Writing",
            "Living Will",
            "Lasting Power of Attorney (LPA)",
        ],
        GuidedStep::Will | GuidedStep::Lpa => &CONTACT_MODES,
        GuidedStep::Bereavement => &[
            "A Little Help",
            "A Little More Help",
            "Lots of Help",
            "Hand It All Over",
            "Online Grief Support",
        ],
        GuidedStep::Final => &[
            "My Documents",
            "Personal Messages",
            "Funeral Wishes",
            "Digital Legacy",
            "Trusted People",
            "Nags",
        ],
        GuidedStep::Chat => return None,
    };

    Some(options.iter().map(|s| s.to_string()).collect())
}

/// Render the greeting and root options once per session
pub fn show_greeting(state: &mut SessionState, view: &mut dyn ChatView, greeting: &str) {
    if state.greeting_rendered() {
        return;
    }

    view.message(Role::Ai, greeting);
    if let Some(options) = options_for(GuidedStep::Root) {
        view.options(&options);
    }
    state.set_greeting_rendered(true);
}

/// Handle a selected option at the current step
///
/// The choice is echoed as a user message before dispatch. A label that is
/// not in the current step's table falls through with no transition and no
/// further output.
pub fn handle_option(
    state: &mut SessionState,
    view: &mut dyn ChatView,
    choice: &str,
) -> FlowOutcome {
    view.message(Role::User, choice);

    match state.guided_step() {
        GuidedStep::Root => handle_root(state, view, choice),
        GuidedStep::Legal => {
            handle_legal(state, view, choice);
            FlowOutcome::Continue
        }
        GuidedStep::Will => {
            handle_contact_mode(state, view, choice, links::SELECT_WILL, "will");
            FlowOutcome::Continue
        }
        GuidedStep::Lpa => {
            handle_contact_mode(state, view, choice, links::SELECT_LPA, "LPA");
            FlowOutcome::Continue
        }
        GuidedStep::Bereavement => {
            handle_link_table(state, view, choice, links::BEREAVEMENT);
            FlowOutcome::Continue
        }
        GuidedStep::Final => {
            handle_link_table(state, view, choice, links::FINAL_WISHES);
            FlowOutcome::Continue
        }
        GuidedStep::Chat => FlowOutcome::Continue,
    }
}

fn handle_root(state: &mut SessionState, view: &mut dyn ChatView, choice: &str) -> FlowOutcome {
    let next = match choice {
        "Legal Document Support" => Some(GuidedStep::Legal),
        "Bereavement Support" => Some(GuidedStep::Bereavement),
        "Final Wishes Support" => Some(GuidedStep::Final),
        CHECK_SUBMISSIONS => return FlowOutcome::CheckSubmissions,
        _ => None,
    };

    if let Some(step) = next {
        state.set_guided_step(step);
        if let Some(options) = options_for(step) {
            view.options(&options);
        }
    }
    FlowOutcome::Continue
}

fn handle_legal(state: &mut SessionState, view: &mut dyn ChatView, choice: &str) {
    match choice {
        "Will Writing" => {
            state.set_guided_step(GuidedStep::Will);
            if let Some(options) = options_for(GuidedStep::Will) {
                view.options(&options);
            }
        }
        "Living Will" => {
            terminal_link(
                state,
                view,
                &link_message(links::LIVING_WILL, "Click here to start your Living Will"),
            );
        }
        "Lasting Power of Attorney (LPA)" => {
            state.set_guided_step(GuidedStep::Lpa);
            if let Some(options) = options_for(GuidedStep::Lpa) {
                view.options(&options);
            }
        }
        _ => {}
    }
}

/// Will and LPA share the same Online/Telephone/Video shape
fn handle_contact_mode(
    state: &mut SessionState,
    view: &mut dyn ChatView,
    choice: &str,
    url: &str,
    subject: &str,
) {
    let text = format!("Click here to start writing your {}", subject);
    match choice {
        "Online" => terminal_link(state, view, &link_message(url, &text)),
        "Telephone" | "Video" => {
            let message = format!(
                "{}<br><br>For {} assistance, please call our team.",
                link_message(url, &text),
                choice
            );
            terminal_link(state, view, &message);
        }
        _ => {}
    }
}

fn handle_link_table(
    state: &mut SessionState,
    view: &mut dyn ChatView,
    choice: &str,
    table: &[(&str, &str)],
) {
    if let Some((label, url)) = table.iter().find(|(label, _)| *label == choice) {
        let text = format!("Click here to check {} support", label);
        terminal_link(state, view, &link_message(url, &text));
    }
}

/// Render a terminal message and leave the guided flow
fn terminal_link(state: &mut SessionState, view: &mut dyn ChatView, message: &str) {
    view.message(Role::Ai, message);
    state.exit_guided_flow();
}

fn link_message(url: &str, text: &str) -> String {
    format!("👉 <a href='{}' target='_blank'>{}</a>", url, text)
}
