use anyhow::Result;

use crate::{
    field::FieldId,
    registry::{ActionRegistry, ActionRegistryBuilder, TogglePair},
};

/// Build the inbuilt action table and its wire-level request table.
///
/// Request ids, in the order clients send them:
///   0 quit, 1 volume, 2 weather, 3 keyboard layout, 4 cpu governor,
///   5 mic mute, 6 refresh of the periodic fields (time, load, temp, memory).
pub fn inbuilt_registry() -> Result<ActionRegistry> {
    let mut builder = ActionRegistryBuilder::new();

    let time = builder.external(r#"date +%H:%M:%S"#, FieldId::Time);
    let load = builder.external(r#"uptime | grep -wo "average: .*," | cut --delimiter=' ' -f2 | head -c4"#, FieldId::Load);
    let temp = builder.external(r#"sensors | grep -F "Core 0" | awk '{print $3}' | cut -c2-5"#, FieldId::Temp);
    let volume = builder.external(r#"amixer sget Master | awk -F'[][]' '/Left:/ {print $2}'"#, FieldId::Volume);
    let memory = builder.external(r#"free --mebi | awk '/^Mem:/ {print $3 "M"}'"#, FieldId::Memory);
    let _date = builder.external(r#"date "+%d.%m.%Y""#, FieldId::Date);
    let weather = builder.external(r#"curl -s 'wttr.in?format=%t' | tr -d '\n'"#, FieldId::Weather);

    let lang = builder.toggle(
        TogglePair {
            labels: ["US", "RO"],
            commands: ["setxkbmap us", "setxkbmap ro -variant std"],
        },
        FieldId::Lang,
    );
    let governor = builder.toggle(
        TogglePair {
            labels: ["*", "$"],
            commands: ["powerprofilesctl set power-saver", "powerprofilesctl set performance"],
        },
        FieldId::Governor,
    );
    let mic = builder.toggle(
        TogglePair {
            labels: ["0", "1"],
            commands: [
                "pactl set-source-mute @DEFAULT_SOURCE@ toggle",
                "pactl set-source-mute @DEFAULT_SOURCE@ toggle",
            ],
        },
        FieldId::Mic,
    );

    let refresh = builder.composite(vec![time, load, temp, memory])?;
    let quit = builder.quit();

    builder.build(vec![quit, volume, weather, lang, governor, mic, refresh])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::registry::{Action, QUIT_REQUEST_ID};

    #[test]
    fn inbuilt_registry_builds() {
        let registry = inbuilt_registry().unwrap();
        assert_eq!(registry.request_count(), 7);
    }

    #[test]
    fn request_zero_is_the_quit_composite() {
        let registry = inbuilt_registry().unwrap();
        let quit = registry.request(QUIT_REQUEST_ID).unwrap();
        assert!(matches!(registry.get(quit), Action::Composite { quit: true, .. }));
    }

    #[test]
    fn every_field_has_exactly_one_writer() {
        let registry = inbuilt_registry().unwrap();
        let mut writers = vec![0usize; FieldId::COUNT];
        for id in registry.action_ids() {
            match registry.get(id) {
                Action::External { target: Some(target), .. } => writers[*target as usize] += 1,
                Action::Toggle { target, .. } => writers[*target as usize] += 1,
                _ => {}
            }
        }
        assert_eq!(writers, vec![1; FieldId::COUNT]);
    }
}
