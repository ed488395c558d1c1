//! Spying quest: the hero spies on the receiver for the initiator.
//!
//! ```text
//! start ──> start_spying ══> spying_middle ══> continue_spying ──> report_data
//!                 ║                ║
//!                 ╚═══> open_up <══╝
//!                          ├──> open_up_finish
//!                          └──> open_up_lying
//! ```
//!
//! `══>` are options, `──>` plain jumps. Both ways of opening up are
//! linked, as are both ways of continuing to spy.

use quest_world::Selector;

use super::{hero_uid, tags, QuestError, QuestRoles, QuestTemplate};
use crate::knowledge_base::catalog::{self, names};
use crate::knowledge_base::{Fact, KnowledgeBase, Registry};

pub struct Spying;

impl QuestTemplate for Spying {
    const TYPE: &'static str = "spying";
    const TAGS: &'static [&'static str] = &[tags::NORMAL, tags::CAN_START, tags::CAN_CONTINUE];

    fn construct<K, S>(
        knowledge_base: &mut K,
        _selector: &mut S,
        roles: &QuestRoles,
    ) -> Result<Vec<Fact>, QuestError>
    where
        K: KnowledgeBase + ?Sized,
        S: Selector + ?Sized,
    {
        let hero = hero_uid(knowledge_base)?;
        let ns = knowledge_base.allocate_namespace();
        let uid = |name: &str| format!("{ns}{name}");
        let registry = Registry::standard();

        let QuestRoles {
            initiator,
            initiator_position,
            receiver,
            receiver_position,
        } = roles;

        let open_up_variants = catalog::event(&uid("open_up_variants"), "Ways to end an open confession")?;

        let start = registry
            .draft(names::START)?
            .with("uid", uid("start"))
            .with("quest_type", Self::TYPE)
            .with("label", "Start")
            .with("description", "A spying assignment")
            .with(
                "require",
                vec![
                    catalog::located_in(&hero, initiator_position)?,
                    catalog::located_in(receiver, receiver_position)?,
                ],
            )
            .with("actions", vec![catalog::message("intro")?])
            .build()?;

        let start_spying = registry
            .draft(names::CHOICE)?
            .with("uid", uid("start_spying"))
            .with("label", "Arrival in the target's town")
            .with("description", "The hero arrives at the target")
            .with("require", vec![catalog::located_in(&hero, receiver_position)?])
            .with("actions", vec![catalog::message("arrived_to_target")?])
            .build()?;

        let spying_middle = registry
            .draft(names::CHOICE)?
            .with("uid", uid("spying_middle"))
            .with("label", "Spying")
            .with("description", "The hero starts spying")
            .with(
                "actions",
                vec![
                    catalog::message("start_spying")?,
                    catalog::located_near(&hero, receiver_position)?,
                ],
            )
            .build()?;

        let continue_spying = registry
            .draft(names::STATE)?
            .with("uid", uid("continue_spying"))
            .with("label", "Keep spying")
            .with("description", "The hero keeps watching the target")
            .with(
                "actions",
                vec![
                    catalog::message("continue_spying")?,
                    catalog::located_near(&hero, receiver_position)?,
                ],
            )
            .build()?;

        let open_up = registry
            .draft(names::STATE)?
            .with("uid", uid("open_up"))
            .with("label", "Open up")
            .with("description", "Tell the target about the spying")
            .with("require", vec![catalog::located_in(&hero, receiver_position)?])
            .with("actions", vec![catalog::message("open_up")?])
            .build()?;

        let report_data = registry
            .draft(names::FINISH)?
            .with("uid", uid("report_data"))
            .with("label", "Report the gathered information")
            .with("description", "Return to the initiator and report")
            .with("require", vec![catalog::located_in(&hero, initiator_position)?])
            .with(
                "actions",
                vec![
                    catalog::message("report_data")?,
                    catalog::give_power(initiator, 1.0)?,
                    catalog::give_power(receiver, -1.0)?,
                ],
            )
            .build()?;

        let open_up_finish = registry
            .draft(names::FINISH)?
            .with("uid", uid("open_up_finish"))
            .with("label", "Finish the quest")
            .with("description", "Finish the quest and stay in the target's town")
            .with_tags([open_up_variants.uid()])
            .with("require", vec![catalog::located_in(&hero, receiver_position)?])
            .with(
                "actions",
                vec![
                    catalog::message("open_up_finish")?,
                    catalog::give_power(initiator, -1.0)?,
                    catalog::give_power(receiver, 1.0)?,
                ],
            )
            .build()?;

        let open_up_lying = registry
            .draft(names::FINISH)?
            .with("uid", uid("open_up_lying"))
            .with("label", "Deceive the initiator")
            .with("description", "Return to the initiator and report false information")
            .with_tags([open_up_variants.uid()])
            .with("require", vec![catalog::located_in(&hero, initiator_position)?])
            .with(
                "actions",
                vec![
                    catalog::message("open_up_lying")?,
                    catalog::give_power(initiator, -1.0)?,
                    catalog::give_power(receiver, 1.0)?,
                ],
            )
            .build()?;

        let to_spying_middle = catalog::option(start_spying.uid(), spying_middle.uid())?;
        let to_open_up_early = catalog::option(start_spying.uid(), open_up.uid())?;
        let to_continue_spying = catalog::option(spying_middle.uid(), continue_spying.uid())?;
        let to_open_up_late = catalog::option(spying_middle.uid(), open_up.uid())?;

        let edges = vec![
            catalog::jump(start.uid(), start_spying.uid())?,
            to_spying_middle.clone(),
            to_open_up_early.clone(),
            to_continue_spying.clone(),
            to_open_up_late.clone(),
            catalog::jump(continue_spying.uid(), report_data.uid())?,
            catalog::jump(open_up.uid(), open_up_finish.uid())?,
            catalog::jump(open_up.uid(), open_up_lying.uid())?,
        ];

        let links = vec![
            catalog::options_link(&[to_open_up_early.uid(), to_open_up_late.uid()])?,
            catalog::options_link(&[to_spying_middle.uid(), to_continue_spying.uid()])?,
        ];

        let mut facts = vec![
            start,
            start_spying,
            spying_middle,
            continue_spying,
            open_up,
            report_data,
            open_up_finish,
            open_up_lying,
        ];
        facts.extend(edges);
        facts.extend(links);
        facts.push(open_up_variants);

        tracing::info!(
            quest = Self::TYPE,
            namespace = %ns,
            hero = %hero,
            initiator = %initiator,
            receiver = %receiver,
            facts = facts.len(),
            "quest constructed"
        );
        Ok(facts)
    }
}
