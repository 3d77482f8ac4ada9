/// Prompt text for the oracle exchanges.

use crate::core::oracle::{OptionSelectionRequest, ResultDirective, Tone};

const BACKGROUND: &str = "\
<background>
In the late 2020s nations turned inward and wars broke out across the world. \
A nuclear strike left Seoul in ruins. There is no government, and survivors raid one another. \
The army is pushing back and will retake the city soon. \
The protagonist wanders the ruins trying to stay alive until that day.
</background>";

const HOST_RULES: &str = "\
You receive the situation so far, the options available in it, and the outcome of each option. \
When the protagonist acts, do two things:
1. Pick the single option whose description follows most naturally from the action, and report its number. \
Always pick one of the given options, even if none fits well.
2. Write a vivid, detailed story that starts with the protagonist's action, continues into the chosen option's description, \
and ends with that option's outcome.
<rules>
1. The story always begins with the protagonist's action, however unreasonable it is.
2. The story always passes through the chosen option's description.
3. The story always ends with the chosen option's outcome, and nothing after it.
4. Action, description and outcome must connect naturally.
5. Mention nothing from the options you did not choose.
</rules>";

const ENCOUNTER_INTRODUCTION: &str = "\
## Overview ##
You describe the given ## situation ## in detail and offer exactly three choices. \
The player may ignore them and describe their own action instead.
Answer in JSON: {\"situation\": \"...\", \"selections\": [\"...\", \"...\", \"...\"]}";

const RESTRICTION: &str = "\
## Restrictions ##
The player lives in the real world; supernatural actions are impossible. \
The player can only solve problems with abilities they actually have, and outlandish actions fail for that reason. \
City infrastructure has collapsed: no electricity, running water or internet.";

const RESULT: &str = "\
## Result ##
Given the situation, the choices and the player's action, describe what happens. \
The result may be positive, negative or neutral. \
Report the story of the result and the change in health, mental and money, each between -2 and 2.";

const TWIST: &str = "\
## Result ##
Given the situation, the choices and the player's action, describe what happens. \
The result must turn out differently from what the player intended. \
Report the story of the result and the change in health, mental and money, each between -2 and 2.";

const CLOSURE: &str = "\
The story has gone on long enough. Bring it to a natural close in this answer.";

const PHASE_END: &str = "\
Decide whether the story of the given ## situation ## is over according to the end condition below. \
Answer true if it is over and false if it should continue.
## End condition ##";

/// System message for the option-selection exchange.
pub fn host_framing(request: &OptionSelectionRequest) -> String {
    let mut out = String::new();
    out.push_str("You are the host of a tabletop role-playing game set in a ruined Seoul.\n");
    out.push_str(BACKGROUND);
    out.push('\n');
    out.push_str(HOST_RULES);
    out.push_str("\n<situation>");
    out.push_str(&request.context);
    out.push_str("</situation>\n<options>\n");
    for (i, option) in request.options.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("<{n}>\n<description>{}</description>\n", option.description));
        if let Some(outcome) = &option.outcome {
            out.push_str(&format!("<outcome>{outcome}</outcome>\n"));
        }
        out.push_str(&format!("</{n}>\n"));
    }
    out.push_str("</options>\n");
    out
}

/// User message carrying the protagonist's action.
pub fn player_action(action: &str) -> String {
    format!("<action>{action}</action>")
}

/// Opening system message for a freeform encounter.
pub fn encounter_opening(situation: &str) -> String {
    format!(
        "You are the host of a survival tabletop role-playing game.\n{BACKGROUND}\n{ENCOUNTER_INTRODUCTION}\n{RESTRICTION}\n## Situation ##\n{situation}"
    )
}

/// The situation and choices as they were shown to the player.
pub fn presented_situation(situation: &str, selections: &[String]) -> String {
    let mut out = situation.to_string();
    for (i, selection) in selections.iter().enumerate() {
        out.push_str(&format!("\n{} : {selection}", i + 1));
    }
    out
}

/// System message steering the result exchange.
pub fn result_directive(directive: ResultDirective) -> String {
    let mut out = match directive.tone {
        Tone::Congruent => RESULT.to_string(),
        Tone::Twist => TWIST.to_string(),
    };
    if directive.demand_closure {
        out.push('\n');
        out.push_str(CLOSURE);
    }
    out.push('\n');
    out.push_str(RESTRICTION);
    out
}

/// System message for the termination exchange.
pub fn phase_end(end_condition: &str) -> String {
    format!("{PHASE_END}\n{end_condition}")
}
